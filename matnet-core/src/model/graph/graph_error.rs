use super::{LinkId, NodeId};
use crate::model::attribute::AttributeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("attempting to get node '{0}' not in graph")]
    MissingNode(NodeId),
    #[error("attempting to get link '{0}' not in graph")]
    MissingLink(LinkId),
    #[error("link '{link}' references {side} node '{node}' which is not in the graph")]
    DanglingLinkReference {
        link: LinkId,
        side: &'static str,
        node: NodeId,
    },
    #[error("failure applying attributes to '{0}': {1}")]
    AttributeError(String, AttributeError),
    #[error("unknown projection '{0}', expected an 'epsg:<code>' string")]
    InvalidProjection(String),
    #[error("link '{0}' has a negative travel time and cannot be searched")]
    NegativeTravelTime(LinkId),
    #[error("link index is inconsistent: {0}")]
    InconsistentIndex(String),
}
