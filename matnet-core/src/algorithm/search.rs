use crate::model::graph::{GraphError, LinkData, LinkId, NodeId, SpatialGraph};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

/// result of a shortest path search, in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPath {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,
    /// sum of the travel times of the chosen links, see [`LinkData::travel_time`]
    pub cost: f64,
}

/// Dijkstra search between two nodes of the graph.
///
/// each step between a pair of nodes weighs the cheapest usable parallel link.
/// when `modes` is given only links permitting one of them are usable.
///
/// # Returns
///
/// `Ok(None)` when `to` cannot be reached from `from`; an error when either
/// node is not in the graph or a usable link met on the way has a negative
/// travel time.
pub fn shortest_path(
    graph: &SpatialGraph,
    from: &NodeId,
    to: &NodeId,
    modes: Option<&[&str]>,
) -> Result<Option<ShortestPath>, GraphError> {
    graph.node(from)?;
    graph.node(to)?;
    let usable = |link: &LinkData| match modes {
        None => true,
        Some(ms) => ms.iter().any(|m| link.permits(m)),
    };

    let mut costs: HashMap<&NodeId, f64> = HashMap::from([(from, 0.0)]);
    let mut prev: HashMap<&NodeId, &NodeId> = HashMap::new();
    let mut settled: HashSet<&NodeId> = HashSet::new();
    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse((OrderedFloat(0.0), from)));

    while let Some(Reverse((OrderedFloat(cost), node))) = frontier.pop() {
        if node == to {
            break;
        }
        if costs.get(node).is_some_and(|c| cost > *c) || !settled.insert(node) {
            continue;
        }
        for next in graph.successors(node) {
            if settled.contains(next) {
                continue;
            }
            let mut step: Option<f64> = None;
            for link in graph.links_between(node, next).into_iter().filter(|l| usable(l)) {
                let time = link.travel_time();
                if time < 0.0 {
                    return Err(GraphError::NegativeTravelTime(link.id.clone()));
                }
                step = Some(step.map_or(time, |s| s.min(time)));
            }
            let Some(step) = step else {
                continue;
            };
            let next_cost = cost + step;
            let improves = match costs.get(next) {
                Some(c) => next_cost < *c,
                None => true,
            };
            if improves {
                costs.insert(next, next_cost);
                prev.insert(next, node);
                frontier.push(Reverse((OrderedFloat(next_cost), next)));
            }
        }
    }

    if !costs.contains_key(to) {
        return Ok(None);
    }
    let mut nodes = vec![to.clone()];
    let mut cursor = to;
    while let Some(p) = prev.get(cursor) {
        nodes.push((*p).clone());
        cursor = *p;
    }
    nodes.reverse();

    let chosen = nodes
        .iter()
        .tuple_windows()
        .map(|(u, v)| {
            let candidates = graph
                .links_between(u, v)
                .into_iter()
                .filter(|l| usable(l))
                .collect_vec();
            choose_link(&candidates, modes).ok_or_else(|| {
                GraphError::InconsistentIndex(format!("no usable link between '{u}' and '{v}'"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ShortestPath {
        cost: chosen.iter().map(|l| l.travel_time()).sum(),
        links: chosen.into_iter().map(|l| l.id.clone()).collect(),
        nodes,
    }))
}

/// picks one of several parallel links for a path step. links serving the fewest
/// modes outside of those requested win, then higher freespeed, then lower travel
/// time, then the smaller id.
pub fn choose_link<'a>(candidates: &[&'a LinkData], modes: Option<&[&str]>) -> Option<&'a LinkData> {
    candidates.iter().copied().min_by_key(|l| {
        let extra_modes = match modes {
            Some(ms) => l.modes.iter().filter(|m| !ms.contains(&m.as_str())).count(),
            None => 0,
        };
        (
            extra_modes,
            Reverse(OrderedFloat(l.freespeed.unwrap_or(0.0))),
            OrderedFloat(l.travel_time()),
            l.id.clone(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::shortest_path;
    use crate::model::{
        change_log::DiscardChanges,
        graph::{GraphError, LinkData, LinkId, NodeData, NodeId, Projection, SpatialGraph},
    };

    fn graph() -> SpatialGraph {
        let mut graph = SpatialGraph::new(Projection::Planar(String::from("epsg:27700")));
        for (id, x) in [("A", 0.0), ("B", 10.0), ("C", 20.0), ("D", 30.0)] {
            graph.add_node(NodeData::new(id, x, 0.0), &mut DiscardChanges);
        }
        graph
            .add_links(
                vec![
                    LinkData::new("ab", "A", "B", &["car", "bus"])
                        .with_length(10.0)
                        .with_freespeed(10.0),
                    LinkData::new("ab_bus", "A", "B", &["bus"])
                        .with_length(10.0)
                        .with_freespeed(5.0),
                    LinkData::new("bc", "B", "C", &["car", "bus"])
                        .with_length(10.0)
                        .with_freespeed(10.0),
                    LinkData::new("ad", "A", "D", &["walk"]).with_length(1.0),
                    LinkData::new("cd", "C", "D", &["car"])
                        .with_length(10.0)
                        .with_freespeed(10.0),
                ],
                &mut DiscardChanges,
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_path_without_modes() {
        let g = graph();
        let path = shortest_path(&g, &NodeId::from("A"), &NodeId::from("D"), None)
            .unwrap()
            .unwrap();
        assert_eq!(path.links, vec![LinkId::from("ad")]);
        assert_eq!(path.cost, 1.0);
    }

    #[test]
    fn test_path_with_modes() {
        let g = graph();
        let path = shortest_path(&g, &NodeId::from("A"), &NodeId::from("D"), Some(&["car"][..]))
            .unwrap()
            .unwrap();
        assert_eq!(
            path.nodes,
            vec![
                NodeId::from("A"),
                NodeId::from("B"),
                NodeId::from("C"),
                NodeId::from("D")
            ]
        );
        assert_eq!(path.cost, 3.0);
    }

    #[test]
    fn test_dedicated_link_preferred() {
        let g = graph();
        let path = shortest_path(&g, &NodeId::from("A"), &NodeId::from("C"), Some(&["bus"][..]))
            .unwrap()
            .unwrap();
        assert_eq!(path.links, vec![LinkId::from("ab_bus"), LinkId::from("bc")]);
        assert_eq!(path.cost, 3.0);
    }

    #[test]
    fn test_disconnected_and_missing() {
        let g = graph();
        let none = shortest_path(&g, &NodeId::from("D"), &NodeId::from("A"), None).unwrap();
        assert!(none.is_none());
        assert!(shortest_path(&g, &NodeId::from("A"), &NodeId::from("Z"), None).is_err());
    }

    #[test]
    fn test_negative_cycle_is_an_error() {
        let mut g = graph();
        g.add_links(
            vec![
                LinkData::new("bx", "B", "A", &["walk"]).with_length(-1.0),
                LinkData::new("ax", "A", "B", &["walk"]).with_length(-1.0),
            ],
            &mut DiscardChanges,
        )
        .unwrap();
        let result = shortest_path(&g, &NodeId::from("A"), &NodeId::from("C"), None);
        assert!(matches!(result, Err(GraphError::NegativeTravelTime(_))));

        let car = shortest_path(&g, &NodeId::from("A"), &NodeId::from("D"), Some(&["car"][..]))
            .unwrap()
            .unwrap();
        assert_eq!(car.cost, 3.0);
    }
}
