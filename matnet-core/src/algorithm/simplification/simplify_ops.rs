use super::{fuse_path, SimplifiedPath, SimplifyError};
use crate::model::{
    change_log::ChangeLogSink,
    graph::{IdGenerator, LinkData, LinkId, NodeId, SpatialGraph},
};
use indexmap::IndexMap;
use itertools::Itertools;
use kdam::{tqdm, Bar, BarExt};
use rayon::prelude::*;
use std::{
    collections::{BTreeSet, HashSet},
    sync::{Arc, Mutex},
};

/// contracts chains of intermediate nodes into single links. runs in three
/// phases: discovery of endpoints and paths over the unmodified graph, fusion
/// of each path into a new link on a pool of `workers` threads, and sequential
/// replacement of the contracted links and nodes.
///
/// # Returns
///
/// The mapping from every removed link id to the id of the link replacing it.
pub fn simplify_graph(
    graph: &mut SpatialGraph,
    workers: usize,
    log: &mut dyn ChangeLogSink,
) -> Result<IndexMap<LinkId, LinkId>, SimplifyError> {
    let endpoints = find_endpoint_node_ids(graph);
    log::info!(
        "simplify: identified {} endpoints out of {} nodes",
        endpoints.len(),
        graph.n_nodes()
    );

    let paths = find_paths_to_simplify(&endpoints, graph)?;
    log::info!("simplify: found {} paths to simplify", paths.len());

    let mut generator = IdGenerator::from_existing(graph.link_ids().map(|l| l.as_str()));
    let new_ids = paths
        .iter()
        .map(|_| LinkId::from(generator.next_free(|c| graph.contains_link(&LinkId::from(c)))))
        .collect_vec();

    let simplified_links = fuse_paths(&paths, new_ids, graph, workers)?;

    let mapping = update_graph(&paths, simplified_links, graph, log)?;
    log::info!(
        "simplified graph has {} nodes, {} links",
        graph.n_nodes(),
        graph.n_links()
    );
    Ok(mapping)
}

/// a node remains an endpoint when any of these hold:
///
///   a) it has more than two distinct neighbors
///   b) it has no predecessors or no successors
///   c) it is its own neighbor (self-loop)
///   d) its number of predecessors differs from its number of successors
///   e) it has exactly one neighbor which is both predecessor and successor
pub fn node_is_endpoint(node_id: &NodeId, graph: &SpatialGraph) -> bool {
    let pred = graph.predecessors(node_id).collect::<BTreeSet<_>>();
    let succ = graph.successors(node_id).collect::<BTreeSet<_>>();
    let neighbors = pred.union(&succ).copied().collect::<BTreeSet<_>>();

    if neighbors.len() > 2 {
        return true;
    }
    if pred.is_empty() || succ.is_empty() {
        return true;
    }
    if neighbors.contains(node_id) {
        return true;
    }
    if pred.len() != succ.len() {
        return true;
    }
    match neighbors.iter().collect_vec()[..] {
        [only] => pred.contains(only) && succ.contains(only),
        _ => false,
    }
}

fn find_endpoint_node_ids(graph: &SpatialGraph) -> HashSet<NodeId> {
    let node_iter = tqdm!(
        graph.node_ids(),
        total = graph.n_nodes(),
        desc = "simplify: find endpoints"
    );
    let endpoints = node_iter
        .filter(|id| node_is_endpoint(id, graph))
        .cloned()
        .collect::<HashSet<_>>();
    eprintln!();
    endpoints
}

/// builds a path from each (endpoint, successor) pair where the successor is
/// not itself an endpoint. paths are returned in a deterministic order.
fn find_paths_to_simplify(
    endpoints: &HashSet<NodeId>,
    graph: &SpatialGraph,
) -> Result<Vec<SimplifiedPath>, SimplifyError> {
    let pairs = endpoints
        .iter()
        .sorted()
        .flat_map(|endpoint| {
            graph
                .successors(endpoint)
                .filter(move |s| !endpoints.contains(*s))
                .map(move |s| (endpoint, s))
        })
        .collect_vec();

    let n_pairs = pairs.len();
    let mut paths = vec![];
    for (endpoint, successor) in tqdm!(
        pairs.into_iter(),
        total = n_pairs,
        desc = "simplify: find paths to simplify"
    ) {
        let path = build_path(endpoint, successor, endpoints, graph)?;
        if path.len() < 3 {
            log::warn!("unexpected simplify pattern near node {successor}, skipping");
            continue;
        }
        paths.push(SimplifiedPath::new(path, graph)?);
    }
    eprintln!();
    Ok(paths)
}

/// walks from an endpoint through its successor until the next endpoint is reached.
fn build_path(
    endpoint: &NodeId,
    endpoint_successor: &NodeId,
    endpoints: &HashSet<NodeId>,
    graph: &SpatialGraph,
) -> Result<Vec<NodeId>, SimplifyError> {
    let mut path = vec![endpoint.clone(), endpoint_successor.clone()];

    for this_successor in graph.successors(endpoint_successor) {
        let mut successor = this_successor;
        if path.contains(successor) {
            continue;
        }
        path.push(successor.clone());
        while !endpoints.contains(successor) {
            let successors = graph
                .successors(successor)
                .filter(|n| !path.contains(n))
                .collect_vec();
            match successors[..] {
                [one_successor] => {
                    successor = one_successor;
                    path.push(successor.clone());
                }
                [] => {
                    // end of a self-looping chain, close it on the endpoint
                    if graph.successors(successor).any(|n| n == endpoint) {
                        path.push(endpoint.clone());
                    } else {
                        log::warn!("unexpected simplify pattern handled near {successor}");
                    }
                    return Ok(path);
                }
                _ => {
                    return Err(SimplifyError::ImpossiblePattern {
                        node: successor.clone(),
                        n_successors: successors.len(),
                    })
                }
            }
        }
        return Ok(path);
    }
    Ok(path)
}

/// fuses every path on a dedicated thread pool. the graph is only read here.
fn fuse_paths(
    paths: &[SimplifiedPath],
    new_ids: Vec<LinkId>,
    graph: &SpatialGraph,
    workers: usize,
) -> Result<Vec<LinkData>, SimplifyError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| SimplifyError::WorkerPool(e.to_string()))?;
    let bar = Arc::new(Mutex::new(
        Bar::builder()
            .total(paths.len())
            .desc(format!("simplify: fuse paths ({} workers)", workers.max(1)))
            .build()
            .map_err(SimplifyError::ProgressBar)?,
    ));

    let result = pool.install(|| {
        paths
            .par_iter()
            .zip(new_ids.into_par_iter())
            .map(|(path, id)| {
                if let Ok(mut b) = bar.clone().lock() {
                    let _ = b.update(1);
                }
                fuse_path(path, graph, id)
            })
            .collect::<Result<Vec<_>, _>>()
    })?;
    eprintln!();
    Ok(result)
}

/// removes contracted links, then interstitial nodes, then adds the simplified links.
fn update_graph(
    paths: &[SimplifiedPath],
    simplified_links: Vec<LinkData>,
    graph: &mut SpatialGraph,
    log: &mut dyn ChangeLogSink,
) -> Result<IndexMap<LinkId, LinkId>, SimplifyError> {
    let mut mapping = IndexMap::new();
    for (path, simplified) in paths.iter().zip(simplified_links.iter()) {
        for link_id in path.link_ids() {
            mapping.insert(link_id.clone(), simplified.id.clone());
        }
    }

    let links_to_remove = mapping.keys().cloned().collect_vec();
    graph.remove_links(&links_to_remove, log)?;

    let nodes_to_remove = paths
        .iter()
        .flat_map(|p| p.interstitial_nodes())
        .unique()
        .cloned()
        .collect_vec();
    for node_id in tqdm!(
        nodes_to_remove.iter(),
        total = nodes_to_remove.len(),
        desc = "simplify: remove interstitial nodes"
    ) {
        if graph.contains_node(node_id) {
            graph.remove_node(node_id, log)?;
        }
    }
    eprintln!();

    for link in simplified_links.into_iter() {
        let expected = link.id.clone();
        let id = graph.add_link(link, None, log)?;
        if id != expected {
            // ids were reserved against the pre-simplification graph
            for target in mapping.values_mut().filter(|t| **t == expected) {
                *target = id.clone();
            }
        }
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::{node_is_endpoint, simplify_graph};
    use crate::model::{
        attribute::AttributeValue as V,
        change_log::ChangeLog,
        graph::{LinkData, LinkId, NodeData, NodeId, Projection, SpatialGraph},
    };

    fn graph_with_nodes(ids: &[&str]) -> (SpatialGraph, ChangeLog) {
        let mut log = ChangeLog::new();
        let mut graph = SpatialGraph::new(Projection::Planar(String::from("epsg:27700")));
        for (i, id) in ids.iter().enumerate() {
            graph.add_node(NodeData::new(id, i as f64 * 10.0, 0.0), &mut log);
        }
        (graph, log)
    }

    #[test]
    fn test_path_contracts_to_one_link() {
        let (mut graph, mut log) = graph_with_nodes(&["A", "B", "C", "D"]);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car"])
                        .with_length(10.0)
                        .with_freespeed(10.0)
                        .with_capacity(600.0),
                    LinkData::new("2", "B", "C", &["car", "bus"])
                        .with_length(10.0)
                        .with_freespeed(20.0)
                        .with_capacity(1000.0),
                    LinkData::new("3", "C", "D", &["car"])
                        .with_length(10.0)
                        .with_freespeed(15.0)
                        .with_capacity(601.0),
                ],
                &mut log,
            )
            .unwrap();
        let mapping = simplify_graph(&mut graph, 2, &mut log).unwrap();

        assert_eq!(graph.n_links(), 1);
        assert_eq!(graph.n_nodes(), 2);
        assert_eq!(mapping.len(), 3);
        let new_id = mapping[&LinkId::from("1")].clone();
        assert!(mapping.values().all(|v| *v == new_id));
        assert!(!["1", "2", "3"].contains(&new_id.as_str()));

        let link = graph.link(&new_id).unwrap();
        assert_eq!(link.from, NodeId::from("A"));
        assert_eq!(link.to, NodeId::from("D"));
        assert_eq!(link.length, Some(30.0));
        assert_eq!(link.freespeed, Some(20.0));
        assert_eq!(link.capacity, Some(601.0));
        assert!(link.permits("car") && link.permits("bus"));
        assert_eq!(link.geometry.as_ref().unwrap().0.len(), 4);
        assert_eq!(
            link.attributes["ids"],
            V::List(vec![V::from("1"), V::from("2"), V::from("3")])
        );
        graph.verify_dual_index().unwrap();
    }

    #[test]
    fn test_bidirectional_chain() {
        let (mut graph, mut log) = graph_with_nodes(&["A", "B", "C"]);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car"]).with_length(1.0),
                    LinkData::new("2", "B", "A", &["car"]).with_length(1.0),
                    LinkData::new("3", "B", "C", &["car"]).with_length(2.0),
                    LinkData::new("4", "C", "B", &["car"]).with_length(2.0),
                ],
                &mut log,
            )
            .unwrap();
        simplify_graph(&mut graph, 1, &mut log).unwrap();
        assert_eq!(graph.n_links(), 2);
        assert!(!graph.contains_node(&NodeId::from("B")));
        assert!(graph.links().all(|l| l.length == Some(3.0)));
    }

    #[test]
    fn test_cul_de_sac_is_not_contracted() {
        let (mut graph, mut log) = graph_with_nodes(&["A", "B", "C", "D", "E"]);
        graph
            .add_links(
                vec![
                    LinkData::new("ab", "A", "B", &["car"]).with_length(10.0),
                    LinkData::new("bc", "B", "C", &["car"]).with_length(10.0),
                    LinkData::new("cd", "C", "D", &["car"]).with_length(10.0),
                    LinkData::new("de", "D", "E", &["car"]).with_length(5.0),
                    LinkData::new("ed", "E", "D", &["car"]).with_length(5.0),
                ],
                &mut log,
            )
            .unwrap();
        let mapping = simplify_graph(&mut graph, 1, &mut log).unwrap();

        assert_eq!(mapping.len(), 3);
        assert!(!mapping.contains_key(&LinkId::from("de")));
        assert!(!mapping.contains_key(&LinkId::from("ed")));
        assert!(graph.contains_node(&NodeId::from("E")));
        assert!(graph.contains_link(&LinkId::from("de")));
        assert!(graph.contains_link(&LinkId::from("ed")));
        assert_eq!(graph.n_links(), 3);
        assert_eq!(graph.n_nodes(), 3);
        let new_link = graph.link(&mapping[&LinkId::from("ab")]).unwrap();
        assert_eq!(new_link.to, NodeId::from("D"));
        graph.verify_dual_index().unwrap();
    }

    #[test]
    fn test_parallel_links_inside_chain() {
        let (mut graph, mut log) = graph_with_nodes(&["A", "B", "C"]);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car"]).with_length(10.0),
                    LinkData::new("1b", "A", "B", &["bus"]).with_length(12.0),
                    LinkData::new("2", "B", "C", &["car"]).with_length(10.0),
                ],
                &mut log,
            )
            .unwrap();
        let mapping = simplify_graph(&mut graph, 1, &mut log).unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping[&LinkId::from("1")], mapping[&LinkId::from("1b")]);
        assert_eq!(graph.n_links(), 1);
        let link = graph.link(&mapping[&LinkId::from("2")]).unwrap();
        assert_eq!(link.length, Some(20.0));
        assert!(link.permits("car") && link.permits("bus"));
        assert_eq!(
            link.attributes["ids"],
            V::List(vec![V::from("1"), V::from("1b"), V::from("2")])
        );
    }

    #[test]
    fn test_endpoint_rules() {
        let (mut graph, mut log) = graph_with_nodes(&["A", "B", "C", "D"]);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car"]),
                    LinkData::new("2", "B", "A", &["car"]),
                    LinkData::new("3", "B", "C", &["car"]),
                    LinkData::new("4", "B", "D", &["car"]),
                    LinkData::new("5", "D", "D", &["car"]),
                ],
                &mut log,
            )
            .unwrap();
        // cul-de-sac: single neighbor which is both predecessor and successor
        assert!(node_is_endpoint(&NodeId::from("A"), &graph));
        // three neighbors
        assert!(node_is_endpoint(&NodeId::from("B"), &graph));
        // sink
        assert!(node_is_endpoint(&NodeId::from("C"), &graph));
        // self-loop
        assert!(node_is_endpoint(&NodeId::from("D"), &graph));
    }
}
