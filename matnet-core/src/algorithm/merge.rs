use crate::model::{
    change_log::ChangeLogSink,
    graph::{spatial_token, GraphError, LinkId, NodeData, NodeId, SpatialGraph},
};
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};

/// where every node and link of a merged graph ended up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphMerge {
    /// id in the merged graph -> id in the receiving graph
    pub node_mapping: HashMap<NodeId, NodeId>,
    pub link_mapping: HashMap<LinkId, LinkId>,
    pub nodes_added: usize,
    pub links_added: usize,
}

/// adds the nodes and links of `other` to `graph`.
///
/// a node sharing its spatial token with a node already in `graph` is mapped
/// onto that node. nodes without a token only match a node with the same id and
/// coordinates. a link whose mapped endpoints and modes match an existing
/// link is mapped onto it. everything else is inserted, reindexing ids on collision.
pub fn merge_graphs(
    graph: &mut SpatialGraph,
    other: &SpatialGraph,
    log: &mut dyn ChangeLogSink,
) -> Result<GraphMerge, GraphError> {
    let resolution = graph.token_resolution();
    let token_of = |node: &NodeData| -> Option<String> {
        node.spatial_token.clone().or_else(|| match (node.lon, node.lat) {
            (Some(lon), Some(lat)) => spatial_token(lon, lat, resolution),
            _ => None,
        })
    };

    let mut by_token: HashMap<String, NodeId> = HashMap::new();
    for node in graph.nodes() {
        if let Some(token) = token_of(node) {
            by_token.entry(token).or_insert_with(|| node.id.clone());
        }
    }

    let mut result = GraphMerge::default();
    for node in other.nodes() {
        let token = token_of(node);
        let existing = match token.as_ref() {
            Some(t) => by_token.get(t).cloned(),
            None => graph
                .node(&node.id)
                .ok()
                .filter(|n| n.x == node.x && n.y == node.y)
                .map(|n| n.id.clone()),
        };
        if let Some(existing) = existing {
            result.node_mapping.insert(node.id.clone(), existing);
            continue;
        }
        let id = graph.add_node(node.clone(), log);
        if let Some(token) = token {
            by_token.insert(token, id.clone());
        }
        result.node_mapping.insert(node.id.clone(), id);
        result.nodes_added += 1;
    }

    for link in other.links() {
        let from = mapped(&result.node_mapping, &link.from)?;
        let to = mapped(&result.node_mapping, &link.to)?;
        let existing = graph
            .links_between(&from, &to)
            .into_iter()
            .find(|l| l.modes == link.modes)
            .map(|l| l.id.clone());
        if let Some(existing) = existing {
            result.link_mapping.insert(link.id.clone(), existing);
            continue;
        }
        let mut incoming = link.clone();
        incoming.from = from;
        incoming.to = to;
        let id = graph.add_link(incoming, None, log)?;
        result.link_mapping.insert(link.id.clone(), id);
        result.links_added += 1;
    }

    let reindexed = result
        .link_mapping
        .iter()
        .filter(|(a, b)| a != b)
        .map(|(a, _)| a)
        .collect::<BTreeSet<_>>();
    log::info!(
        "merge: added {} nodes and {} links, {} link ids changed ({})",
        result.nodes_added,
        result.links_added,
        reindexed.len(),
        reindexed.iter().take(10).join(", ")
    );
    Ok(result)
}

fn mapped(mapping: &HashMap<NodeId, NodeId>, node_id: &NodeId) -> Result<NodeId, GraphError> {
    mapping
        .get(node_id)
        .cloned()
        .ok_or_else(|| GraphError::MissingNode(node_id.clone()))
}
