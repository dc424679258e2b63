use super::ValidationConfig;
use crate::{
    algorithm::components::strongly_connected_components,
    model::graph::{connected_node_ids, LinkData, LinkId, NodeId, SpatialGraph},
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    /// connectivity of the subgraph of each validated mode
    pub graph_connectivity: BTreeMap<String, ModeConnectivity>,
    /// nodes with no incident links in any mode
    pub isolated_nodes: Vec<NodeId>,
    pub link_attributes: LinkAttributeReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConnectivity {
    pub number_of_connected_subgraphs: usize,
    /// nodes that can be reached but not left
    pub dead_ends: Vec<NodeId>,
    /// nodes that can be left but not reached
    pub unreachable_nodes: Vec<NodeId>,
}

/// links selected by a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSelection {
    pub number_of: usize,
    pub percentage: f64,
    pub link_ids: Vec<LinkId>,
}

/// numeric link attribute checks, by check then attribute. attributes no link
/// fails are omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkAttributeReport {
    pub links_over_length_threshold: Option<LinkSelection>,
    pub zero_attributes: BTreeMap<String, LinkSelection>,
    pub negative_attributes: BTreeMap<String, LinkSelection>,
    pub infinite_attributes: BTreeMap<String, LinkSelection>,
    pub fractional_attributes: BTreeMap<String, LinkSelection>,
    pub none_attributes: BTreeMap<String, LinkSelection>,
}

impl GraphReport {
    pub fn from_graph(graph: &SpatialGraph, config: &ValidationConfig) -> GraphReport {
        let graph_connectivity = config
            .modes
            .iter()
            .map(|mode| {
                let subgraph = graph.modal_subgraph(&[mode.as_str()]);
                let connectivity = ModeConnectivity::from_graph(&subgraph);
                log::debug!(
                    "mode '{mode}': {} strongly connected components",
                    connectivity.number_of_connected_subgraphs
                );
                (mode.clone(), connectivity)
            })
            .collect();

        let connected = connected_node_ids(graph);
        let isolated_nodes = graph
            .node_ids()
            .filter(|n| !connected.contains(n))
            .cloned()
            .collect_vec();

        GraphReport {
            graph_connectivity,
            isolated_nodes,
            link_attributes: LinkAttributeReport::from_graph(graph, config),
        }
    }
}

impl ModeConnectivity {
    pub fn from_graph(graph: &SpatialGraph) -> ModeConnectivity {
        let nodes = graph.node_ids().cloned().collect_vec();
        let components =
            strongly_connected_components(&nodes, |n| graph.successors(n).cloned().collect_vec());
        ModeConnectivity {
            number_of_connected_subgraphs: components.len(),
            dead_ends: graph
                .node_ids()
                .filter(|n| graph.out_degree(n) == 0)
                .cloned()
                .collect(),
            unreachable_nodes: graph
                .node_ids()
                .filter(|n| graph.in_degree(n) == 0)
                .cloned()
                .collect(),
        }
    }
}

impl LinkAttributeReport {
    pub fn from_graph(graph: &SpatialGraph, config: &ValidationConfig) -> LinkAttributeReport {
        let n_links = graph.n_links();
        let select = |check: &dyn Fn(&LinkData) -> bool| -> Option<LinkSelection> {
            let link_ids = graph
                .links()
                .filter(|l| check(l))
                .map(|l| l.id.clone())
                .collect_vec();
            if link_ids.is_empty() {
                return None;
            }
            Some(LinkSelection {
                number_of: link_ids.len(),
                percentage: link_ids.len() as f64 / n_links as f64,
                link_ids,
            })
        };
        let per_attribute = |attributes: &[&str], check: &dyn Fn(f64) -> bool| {
            attributes
                .iter()
                .filter_map(|attr| {
                    let selection = select(&|l: &LinkData| l.numeric_value(attr).is_some_and(check))?;
                    Some((attr.to_string(), selection))
                })
                .collect::<BTreeMap<_, _>>()
        };

        let numeric = LinkData::NUMERIC_FIELDS;
        let integer = config.integer_attributes.iter().map(|a| a.as_str()).collect_vec();
        let threshold = config.link_length_threshold;

        LinkAttributeReport {
            links_over_length_threshold: select(&|l: &LinkData| {
                l.length.is_some_and(|v| v > threshold)
            }),
            zero_attributes: per_attribute(&numeric[..], &|v| v == 0.0),
            negative_attributes: per_attribute(&numeric[..], &|v| v < 0.0),
            infinite_attributes: per_attribute(&numeric[..], &|v| v.is_infinite()),
            fractional_attributes: per_attribute(&integer[..], &|v| v.is_finite() && v.fract() != 0.0),
            none_attributes: numeric
                .iter()
                .filter_map(|attr| {
                    let selection = select(&|l: &LinkData| {
                        l.numeric_value(attr).map_or(true, |v| v.is_nan())
                    })?;
                    Some((attr.to_string(), selection))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GraphReport;
    use crate::{
        model::{
            change_log::DiscardChanges,
            graph::{LinkData, LinkId, NodeData, NodeId, Projection, SpatialGraph},
        },
        validation::ValidationConfig,
    };

    fn graph() -> SpatialGraph {
        let mut graph = SpatialGraph::new(Projection::Planar(String::from("epsg:27700")));
        for (id, x) in [("A", 0.0), ("B", 10.0), ("C", 20.0), ("Z", 99.0)] {
            graph.add_node(NodeData::new(id, x, 0.0), &mut DiscardChanges);
        }
        graph
            .add_links(
                vec![
                    LinkData::new("ab", "A", "B", &["car"])
                        .with_length(10.0)
                        .with_capacity(600.5)
                        .with_freespeed(0.0),
                    LinkData::new("ba", "B", "A", &["car"])
                        .with_length(1500.0)
                        .with_capacity(600.0)
                        .with_freespeed(f64::INFINITY),
                    LinkData::new("bc", "B", "C", &["car", "walk"]).with_length(-1.0),
                ],
                &mut DiscardChanges,
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_connectivity_per_mode() {
        let report = GraphReport::from_graph(&graph(), &ValidationConfig::default());
        let car = &report.graph_connectivity["car"];
        assert_eq!(car.number_of_connected_subgraphs, 2);
        assert_eq!(car.dead_ends, vec![NodeId::from("C")]);
        assert!(car.unreachable_nodes.is_empty());

        let walk = &report.graph_connectivity["walk"];
        assert_eq!(walk.number_of_connected_subgraphs, 2);
        assert_eq!(walk.unreachable_nodes, vec![NodeId::from("B")]);

        let bike = &report.graph_connectivity["bike"];
        assert_eq!(bike.number_of_connected_subgraphs, 0);
        assert_eq!(report.isolated_nodes, vec![NodeId::from("Z")]);
    }

    #[test]
    fn test_link_attribute_scan() {
        let report = GraphReport::from_graph(&graph(), &ValidationConfig::default());
        let attrs = &report.link_attributes;
        let over = attrs.links_over_length_threshold.as_ref().unwrap();
        assert_eq!(over.link_ids, vec![LinkId::from("ba")]);
        assert_eq!(attrs.zero_attributes["freespeed"].link_ids, vec![LinkId::from("ab")]);
        assert_eq!(attrs.infinite_attributes["freespeed"].link_ids, vec![LinkId::from("ba")]);
        assert_eq!(attrs.negative_attributes["length"].link_ids, vec![LinkId::from("bc")]);
        assert_eq!(attrs.fractional_attributes["capacity"].link_ids, vec![LinkId::from("ab")]);
        assert_eq!(attrs.none_attributes["capacity"].number_of, 1);
        assert_eq!(attrs.none_attributes["permlanes"].number_of, 3);
        assert_eq!(attrs.none_attributes["permlanes"].percentage, 1.0);
        assert!(!attrs.fractional_attributes.contains_key("length"));
    }
}
