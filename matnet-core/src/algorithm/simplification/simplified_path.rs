use super::SimplifyError;
use crate::model::graph::{LinkId, NodeId, SpatialGraph};
use itertools::Itertools;

/// a chain of nodes between two endpoints along with the links joining each
/// consecutive pair, discovered before any part of the graph is modified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimplifiedPath {
    path: Vec<NodeId>,
    /// all parallel links for each step of the path, in multi index order
    steps: Vec<Vec<LinkId>>,
}

impl SimplifiedPath {
    pub fn new(path: Vec<NodeId>, graph: &SpatialGraph) -> Result<SimplifiedPath, SimplifyError> {
        if path.len() < 2 {
            return Err(SimplifyError::PathTooShort(path.len()));
        }
        let steps = path
            .iter()
            .tuple_windows()
            .map(|(u, v)| {
                let links = graph
                    .links_between(u, v)
                    .into_iter()
                    .map(|l| l.id.clone())
                    .collect_vec();
                if links.is_empty() {
                    Err(SimplifyError::MissingStep(u.clone(), v.clone()))
                } else {
                    Ok(links)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SimplifiedPath { path, steps })
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn steps(&self) -> &[Vec<LinkId>] {
        &self.steps
    }

    pub fn src(&self) -> &NodeId {
        &self.path[0]
    }

    pub fn dst(&self) -> &NodeId {
        &self.path[self.path.len() - 1]
    }

    /// every node except the first and last.
    pub fn interstitial_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.path.iter().dropping(1).dropping_back(1)
    }

    /// every link contracted by this path.
    pub fn link_ids(&self) -> impl Iterator<Item = &LinkId> {
        self.steps.iter().flatten()
    }
}
