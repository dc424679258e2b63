use crate::model::graph::{GraphError, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimplifyError {
    #[error(transparent)]
    GraphError(#[from] GraphError),
    #[error("impossible simplify pattern near node '{node}', which has {n_successors} successors outside of the path and should be an endpoint")]
    ImpossiblePattern { node: NodeId, n_successors: usize },
    #[error("simplified path must contain at least two nodes, found {0}")]
    PathTooShort(usize),
    #[error("no links found between '{0}' and '{1}' along a simplified path")]
    MissingStep(NodeId, NodeId),
    #[error("failure building simplification worker pool: {0}")]
    WorkerPool(String),
    #[error("failure building progress bar: {0}")]
    ProgressBar(String),
}
