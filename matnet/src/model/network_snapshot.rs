use super::MatnetCliError;
use h3o::Resolution;
use indexmap::IndexMap;
use matnet_core::model::{
    change_log::DiscardChanges,
    graph::{LinkData, LinkId, NodeData, Projection, SpatialGraph},
    network::{Network, NetworkError},
    schedule::Schedule,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// JSON document holding a whole network and its schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub projection: Projection,
    pub nodes: Vec<NodeData>,
    pub links: Vec<LinkData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    /// original link id -> simplified link id, present once simplified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_simplification_map: Option<IndexMap<LinkId, LinkId>>,
}

impl NetworkSnapshot {
    pub fn read(path: &Path) -> Result<NetworkSnapshot, MatnetCliError> {
        let file = File::open(path).map_err(|e| {
            MatnetCliError::ConfigurationError(format!(
                "unable to open network file {}: {e}",
                path.to_string_lossy()
            ))
        })?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }

    pub fn write(&self, path: &Path, overwrite: bool) -> Result<(), MatnetCliError> {
        if path.exists() && !overwrite {
            return Err(MatnetCliError::OutputError(format!(
                "{} already exists, set overwrite to replace it",
                path.to_string_lossy()
            )));
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn from_network(network: &Network) -> NetworkSnapshot {
        let graph = network.graph();
        NetworkSnapshot {
            projection: graph.projection().clone(),
            nodes: graph.nodes().cloned().collect(),
            links: graph.links().cloned().collect(),
            schedule: network.schedule().cloned(),
            link_simplification_map: match network.is_simplified() {
                true => Some(network.link_simplification_map().clone()),
                false => None,
            },
        }
    }

    /// builds the network without recording changes. schedule references are
    /// not checked so that validation can report on them. repeated node or link
    /// ids are an error, since links and the schedule refer to elements by id.
    pub fn into_network(self, resolution: Resolution) -> Result<Network, MatnetCliError> {
        let repeated_nodes = self.nodes.iter().map(|n| &n.id).duplicates().collect_vec();
        if !repeated_nodes.is_empty() {
            return Err(MatnetCliError::SnapshotError(format!(
                "repeated node ids: {}",
                repeated_nodes.iter().join(", ")
            )));
        }
        let repeated_links = self.links.iter().map(|l| &l.id).duplicates().collect_vec();
        if !repeated_links.is_empty() {
            return Err(MatnetCliError::SnapshotError(format!(
                "repeated link ids: {}",
                repeated_links.iter().join(", ")
            )));
        }
        let mut graph = SpatialGraph::new(self.projection).with_token_resolution(resolution);
        graph.add_nodes(self.nodes, &mut DiscardChanges);
        graph
            .add_links(self.links, &mut DiscardChanges)
            .map_err(NetworkError::from)?;
        let network = match self.schedule {
            Some(schedule) => Network::with_schedule(graph, schedule),
            None => Network::new(graph),
        };
        let network = match self.link_simplification_map {
            Some(mapping) => network.with_simplification(mapping),
            None => network,
        };
        log::info!(
            "loaded network with {} nodes, {} links",
            network.graph().n_nodes(),
            network.graph().n_links()
        );
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::NetworkSnapshot;
    use crate::model::MatnetCliError;
    use h3o::Resolution;
    use matnet_core::model::graph::{LinkId, NodeId};

    const SNAPSHOT: &str = r#"{
        "projection": "epsg:27700",
        "nodes": [
            {"id": "A", "x": 0.0, "y": 0.0},
            {"id": "B", "x": 3.0, "y": 4.0}
        ],
        "links": [
            {"id": "ab", "from": "A", "to": "B", "modes": ["car"], "freespeed": 10.0}
        ],
        "schedule": {"services": []}
    }"#;

    #[test]
    fn test_snapshot_into_network() {
        let snapshot: NetworkSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let network = snapshot.into_network(Resolution::Fifteen).unwrap();
        let link = network.graph().link(&LinkId::from("ab")).unwrap();
        assert_eq!(link.length, Some(5.0));
        assert!(network.graph().contains_node(&NodeId::from("B")));
        assert!(network.schedule().is_some());
        assert!(network.change_log().is_empty());
        assert!(!network.is_simplified());

        let back = NetworkSnapshot::from_network(&network);
        assert_eq!(back.links.len(), 1);
        assert!(back.link_simplification_map.is_none());
    }

    #[test]
    fn test_dangling_link_fails() {
        let mut snapshot: NetworkSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        snapshot.nodes.pop();
        assert!(snapshot.into_network(Resolution::Fifteen).is_err());
    }

    #[test]
    fn test_repeated_link_id_fails() {
        let mut snapshot: NetworkSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let mut repeated = snapshot.links[0].clone();
        repeated.from = NodeId::from("B");
        repeated.to = NodeId::from("A");
        snapshot.links.push(repeated);
        let result = snapshot.into_network(Resolution::Fifteen);
        assert!(matches!(result, Err(MatnetCliError::SnapshotError(msg)) if msg.contains("ab")));
    }
}
