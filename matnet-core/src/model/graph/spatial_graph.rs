use super::{
    AdjacencyDirection as Dir, GraphError, IdGenerator, LinkData, LinkId, NodeData, NodeId,
    Projection,
};
use crate::model::{
    attribute::{AttributeMap, AttributeValue, ConditionSet},
    change_log::{ChangeEvent, ChangeLogSink, ObjectType},
};
use h3o::Resolution;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// forward and reverse adjacency, keyed by node and direction
pub type AdjacencyList = HashMap<(NodeId, Dir), BTreeSet<NodeId>>;
/// parallel links stored wrt their from/to node pair, by multi index
pub type MultiEdges = HashMap<(NodeId, NodeId), BTreeMap<usize, LinkId>>;

/// position of a link in the underlying multigraph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkSlot {
    pub from: NodeId,
    pub to: NodeId,
    pub multi_index: usize,
}

/// directed multigraph of nodes and links. every link carries a network-wide
/// unique [`LinkId`] in addition to its positional multi index within the
/// (from, to) pair, and both indices are updated together on every mutation.
#[derive(Debug, Clone)]
pub struct SpatialGraph {
    projection: Projection,
    token_resolution: Resolution,
    nodes: IndexMap<NodeId, NodeData>,
    links: IndexMap<LinkId, LinkData>,
    multiedges: MultiEdges,
    /// multi index of each link within its (from, to) pair
    slots: HashMap<LinkId, usize>,
    adj: AdjacencyList,
}

impl Default for SpatialGraph {
    fn default() -> Self {
        SpatialGraph::new(Projection::default())
    }
}

impl SpatialGraph {
    pub fn new(projection: Projection) -> SpatialGraph {
        SpatialGraph {
            projection,
            token_resolution: Resolution::Fifteen,
            nodes: IndexMap::new(),
            links: IndexMap::new(),
            multiedges: HashMap::new(),
            slots: HashMap::new(),
            adj: HashMap::new(),
        }
    }

    pub fn with_token_resolution(mut self, resolution: Resolution) -> SpatialGraph {
        self.token_resolution = resolution;
        self
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn token_resolution(&self) -> Resolution {
        self.token_resolution
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_links(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn contains_link(&self, link_id: &LinkId) -> bool {
        self.links.contains_key(link_id)
    }

    /// helper with error handling for getting the node data for a given node id
    pub fn node(&self, node_id: &NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| GraphError::MissingNode(node_id.clone()))
    }

    /// helper with error handling for getting the link data for a given link id
    pub fn link(&self, link_id: &LinkId) -> Result<&LinkData, GraphError> {
        self.links
            .get(link_id)
            .ok_or_else(|| GraphError::MissingLink(link_id.clone()))
    }

    pub fn link_slot(&self, link_id: &LinkId) -> Result<LinkSlot, GraphError> {
        let link = self.link(link_id)?;
        let multi_index = self.slots.get(link_id).ok_or_else(|| {
            GraphError::InconsistentIndex(format!("link '{link_id}' has no multi index"))
        })?;
        Ok(LinkSlot {
            from: link.from.clone(),
            to: link.to.clone(),
            multi_index: *multi_index,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkData> {
        self.links.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn link_ids(&self) -> impl Iterator<Item = &LinkId> {
        self.links.keys()
    }

    /// every mode permitted by at least one link.
    pub fn modes(&self) -> BTreeSet<String> {
        self.links
            .values()
            .flat_map(|l| l.modes.iter().cloned())
            .collect()
    }

    /// parallel links from `from` to `to`, in multi index order.
    pub fn links_between(&self, from: &NodeId, to: &NodeId) -> Vec<&LinkData> {
        match self.multiedges.get(&(from.clone(), to.clone())) {
            None => vec![],
            Some(multiedges) => multiedges
                .values()
                .filter_map(|id| self.links.get(id))
                .collect(),
        }
    }

    pub fn successors(&self, node_id: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.neighbors(node_id, Dir::Forward)
    }

    pub fn predecessors(&self, node_id: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.neighbors(node_id, Dir::Reverse)
    }

    pub fn neighbors(&self, node_id: &NodeId, direction: Dir) -> impl Iterator<Item = &NodeId> {
        self.adj
            .get(&(node_id.clone(), direction))
            .into_iter()
            .flat_map(|ns| ns.iter())
    }

    pub fn out_degree(&self, node_id: &NodeId) -> usize {
        self.successors(node_id).count()
    }

    pub fn in_degree(&self, node_id: &NodeId) -> usize {
        self.predecessors(node_id).count()
    }

    pub fn out_links(&self, node_id: &NodeId) -> Vec<&LinkData> {
        self.successors(node_id)
            .flat_map(|dst| self.links_between(node_id, dst))
            .collect()
    }

    pub fn in_links(&self, node_id: &NodeId) -> Vec<&LinkData> {
        self.predecessors(node_id)
            .flat_map(|src| self.links_between(src, node_id))
            .collect()
    }

    /// adds a node under its proposed id, or under a freshly generated id when
    /// the proposed one is taken. returns the id actually used.
    pub fn add_node(&mut self, node: NodeData, log: &mut dyn ChangeLogSink) -> NodeId {
        let mut generator: Option<IdGenerator> = None;
        self.insert_node(node, &mut generator, log)
    }

    /// batch variant of [`SpatialGraph::add_node`]. returns the proposed -> final
    /// id mapping for ids that changed, and the committed node ids in order.
    pub fn add_nodes(
        &mut self,
        nodes: Vec<NodeData>,
        log: &mut dyn ChangeLogSink,
    ) -> (HashMap<NodeId, NodeId>, Vec<NodeId>) {
        let mut generator: Option<IdGenerator> = None;
        let mut reindexed = HashMap::new();
        let mut committed = Vec::with_capacity(nodes.len());
        for node in nodes.into_iter() {
            let proposed = node.id.clone();
            let id = self.insert_node(node, &mut generator, log);
            if id != proposed {
                reindexed.insert(proposed, id.clone());
            }
            committed.push(id);
        }
        if !reindexed.is_empty() {
            log::info!("reindexed {} nodes on insert", reindexed.len());
        }
        (reindexed, committed)
    }

    /// adds a link under its proposed id, reindexing on collision. when the
    /// requested multi index is already occupied for the node pair, the next
    /// free index is used. the length is derived from node coordinates when absent.
    pub fn add_link(
        &mut self,
        link: LinkData,
        multi_index: Option<usize>,
        log: &mut dyn ChangeLogSink,
    ) -> Result<LinkId, GraphError> {
        self.check_link_endpoints(&link)?;
        let mut generator: Option<IdGenerator> = None;
        Ok(self.insert_link(link, multi_index, &mut generator, log))
    }

    /// batch variant of [`SpatialGraph::add_link`]. every link's endpoints are
    /// checked before anything is inserted; id collisions with the graph or
    /// within the batch are reindexed. returns the proposed -> final id mapping
    /// for ids that changed and the committed links by final id.
    pub fn add_links(
        &mut self,
        links: Vec<LinkData>,
        log: &mut dyn ChangeLogSink,
    ) -> Result<(HashMap<LinkId, LinkId>, IndexMap<LinkId, LinkData>), GraphError> {
        for link in links.iter() {
            self.check_link_endpoints(link)?;
        }
        let mut generator: Option<IdGenerator> = None;
        let mut reindexed = HashMap::new();
        let mut committed = IndexMap::with_capacity(links.len());
        for link in links.into_iter() {
            let proposed = link.id.clone();
            let id = self.insert_link(link, None, &mut generator, log);
            if id != proposed {
                reindexed.insert(proposed, id.clone());
            }
            let data = self.link(&id)?.clone();
            committed.insert(id, data);
        }
        if !reindexed.is_empty() {
            log::info!("reindexed {} links on insert", reindexed.len());
        }
        Ok((reindexed, committed))
    }

    /// removes a single link, recording its last state.
    pub fn remove_link(
        &mut self,
        link_id: &LinkId,
        log: &mut dyn ChangeLogSink,
    ) -> Result<LinkData, GraphError> {
        let link = self.detach_link(link_id)?;
        log.record(ChangeEvent::remove(
            ObjectType::Link,
            link.id.as_str(),
            link.to_attribute_map(),
        ));
        Ok(link)
    }

    /// removes a set of links. fails without removing anything if any id is unknown.
    pub fn remove_links(
        &mut self,
        link_ids: &[LinkId],
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<LinkData>, GraphError> {
        if let Some(missing) = link_ids.iter().find(|id| !self.contains_link(id)) {
            return Err(GraphError::MissingLink(missing.clone()));
        }
        link_ids
            .iter()
            .unique()
            .map(|id| self.remove_link(id, log))
            .collect()
    }

    /// removes a node along with every link incident to it.
    pub fn remove_node(
        &mut self,
        node_id: &NodeId,
        log: &mut dyn ChangeLogSink,
    ) -> Result<NodeData, GraphError> {
        if !self.contains_node(node_id) {
            return Err(GraphError::MissingNode(node_id.clone()));
        }
        let incident = self
            .out_links(node_id)
            .into_iter()
            .chain(self.in_links(node_id))
            .map(|l| l.id.clone())
            .unique()
            .collect_vec();
        for link_id in incident.iter() {
            self.remove_link(link_id, log)?;
        }
        self.adj.remove(&(node_id.clone(), Dir::Forward));
        self.adj.remove(&(node_id.clone(), Dir::Reverse));
        let node = self
            .nodes
            .shift_remove(node_id)
            .ok_or_else(|| GraphError::MissingNode(node_id.clone()))?;
        log.record(ChangeEvent::remove(
            ObjectType::Node,
            node.id.as_str(),
            node.to_attribute_map(),
        ));
        Ok(node)
    }

    /// removes several nodes. fails without removing anything if any id is unknown.
    pub fn remove_nodes(
        &mut self,
        node_ids: &[NodeId],
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<NodeData>, GraphError> {
        if let Some(missing) = node_ids.iter().find(|id| !self.contains_node(id)) {
            return Err(GraphError::MissingNode(missing.clone()));
        }
        node_ids
            .iter()
            .unique()
            .map(|id| self.remove_node(id, log))
            .collect()
    }

    /// edge-induced subgraph of the links permitting any of the given modes.
    pub fn modal_subgraph(&self, modes: &[&str]) -> SpatialGraph {
        let link_ids = self
            .links
            .values()
            .filter(|l| modes.iter().any(|m| l.permits(m)))
            .map(|l| &l.id);
        self.subgraph_from_links(link_ids)
    }

    /// edge-induced subgraph of the given links. ids and multi indices are preserved
    /// and unknown link ids are ignored.
    pub fn subgraph_from_links<'a, I>(&self, link_ids: I) -> SpatialGraph
    where
        I: IntoIterator<Item = &'a LinkId>,
    {
        let mut sub = SpatialGraph::new(self.projection.clone())
            .with_token_resolution(self.token_resolution);
        for link_id in link_ids.into_iter() {
            let (Some(link), Some(slot)) = (self.links.get(link_id), self.slots.get(link_id))
            else {
                continue;
            };
            for node_id in [&link.from, &link.to] {
                if let (false, Some(node)) = (sub.contains_node(node_id), self.nodes.get(node_id))
                {
                    sub.nodes.insert(node_id.clone(), node.clone());
                }
            }
            sub.attach_link(link.clone(), *slot);
        }
        sub
    }

    /// bulk update of node attributes. ids not in the graph are skipped, nodes that
    /// fail `conditions` are left untouched. every update is checked before any is
    /// committed; each changed node is recorded once. returns the ids changed.
    pub fn apply_attributes_to_nodes(
        &mut self,
        mapping: &IndexMap<NodeId, AttributeMap>,
        conditions: Option<&ConditionSet>,
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<NodeId>, GraphError> {
        let mut staged = vec![];
        for (node_id, attributes) in mapping.iter() {
            let Some(node) = self.nodes.get(node_id) else {
                log::warn!("node '{node_id}' not in graph, skipping attribute update");
                continue;
            };
            let before = node.to_attribute_map();
            if conditions.is_some_and(|c| !c.matches(&before)) {
                continue;
            }
            let mut updated = node.clone();
            for (key, value) in attributes.iter() {
                updated
                    .set_attribute(key, value.clone())
                    .map_err(|e| GraphError::AttributeError(node_id.to_string(), e))?;
            }
            staged.push((before, updated));
        }
        let mut changed = vec![];
        for (before, updated) in staged.into_iter() {
            let after = updated.to_attribute_map();
            if before == after {
                continue;
            }
            log.record(ChangeEvent::modify(
                ObjectType::Node,
                updated.id.as_str(),
                before,
                after,
            ));
            changed.push(updated.id.clone());
            self.nodes.insert(updated.id.clone(), updated);
        }
        Ok(changed)
    }

    /// bulk update of link attributes, following the same rules as
    /// [`SpatialGraph::apply_attributes_to_nodes`].
    pub fn apply_attributes_to_links(
        &mut self,
        mapping: &IndexMap<LinkId, AttributeMap>,
        conditions: Option<&ConditionSet>,
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<LinkId>, GraphError> {
        let mut staged = vec![];
        for (link_id, attributes) in mapping.iter() {
            let Some(link) = self.links.get(link_id) else {
                log::warn!("link '{link_id}' not in graph, skipping attribute update");
                continue;
            };
            let before = link.to_attribute_map();
            if conditions.is_some_and(|c| !c.matches(&before)) {
                continue;
            }
            let mut updated = link.clone();
            for (key, value) in attributes.iter() {
                updated
                    .set_attribute(key, value.clone())
                    .map_err(|e| GraphError::AttributeError(link_id.to_string(), e))?;
            }
            staged.push((before, updated));
        }
        Ok(self.commit_link_updates(staged, log))
    }

    /// computes `attribute` for every link from its current state. links for
    /// which `f` returns None are left as they are.
    pub fn apply_function_to_links<F>(
        &mut self,
        f: F,
        attribute: &str,
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<LinkId>, GraphError>
    where
        F: Fn(&LinkData) -> Option<AttributeValue>,
    {
        let mut staged = vec![];
        for link in self.links.values() {
            let Some(value) = f(link) else {
                continue;
            };
            let mut updated = link.clone();
            updated
                .set_attribute(attribute, value)
                .map_err(|e| GraphError::AttributeError(link.id.to_string(), e))?;
            staged.push((link.to_attribute_map(), updated));
        }
        Ok(self.commit_link_updates(staged, log))
    }

    pub fn apply_function_to_nodes<F>(
        &mut self,
        f: F,
        attribute: &str,
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<NodeId>, GraphError>
    where
        F: Fn(&NodeData) -> Option<AttributeValue>,
    {
        let mapping = self
            .nodes
            .values()
            .filter_map(|n| {
                f(n).map(|v| {
                    (
                        n.id.clone(),
                        AttributeMap::from([(attribute.to_string(), v)]),
                    )
                })
            })
            .collect::<IndexMap<_, _>>();
        self.apply_attributes_to_nodes(&mapping, None, log)
    }

    pub fn extract_links_on_attributes(&self, conditions: &ConditionSet) -> Vec<LinkId> {
        self.links
            .values()
            .filter(|l| conditions.matches(&l.to_attribute_map()))
            .map(|l| l.id.clone())
            .collect()
    }

    pub fn extract_nodes_on_attributes(&self, conditions: &ConditionSet) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| conditions.matches(&n.to_attribute_map()))
            .map(|n| n.id.clone())
            .collect()
    }

    /// confirms that link ids, multi indices and adjacencies all describe the same graph.
    pub fn verify_dual_index(&self) -> Result<(), GraphError> {
        for (link_id, link) in self.links.iter() {
            let slot = self.slots.get(link_id).ok_or_else(|| {
                GraphError::InconsistentIndex(format!("link '{link_id}' has no multi index"))
            })?;
            let stored = self
                .multiedges
                .get(&(link.from.clone(), link.to.clone()))
                .and_then(|m| m.get(slot));
            if stored != Some(link_id) {
                return Err(GraphError::InconsistentIndex(format!(
                    "link '{link_id}' not found at ({}, {}, {slot})",
                    link.from, link.to
                )));
            }
            let forward = self
                .adj
                .get(&(link.from.clone(), Dir::Forward))
                .is_some_and(|s| s.contains(&link.to));
            let reverse = self
                .adj
                .get(&(link.to.clone(), Dir::Reverse))
                .is_some_and(|s| s.contains(&link.from));
            if !forward || !reverse {
                return Err(GraphError::InconsistentIndex(format!(
                    "link '{link_id}' missing from adjacency list"
                )));
            }
        }
        let n_slots: usize = self.multiedges.values().map(|m| m.len()).sum();
        if n_slots != self.links.len() || self.slots.len() != self.links.len() {
            return Err(GraphError::InconsistentIndex(format!(
                "{} links but {} multiedge slots and {} slot entries",
                self.links.len(),
                n_slots,
                self.slots.len()
            )));
        }
        Ok(())
    }

    fn commit_link_updates(
        &mut self,
        staged: Vec<(AttributeMap, LinkData)>,
        log: &mut dyn ChangeLogSink,
    ) -> Vec<LinkId> {
        let mut changed = vec![];
        for (before, updated) in staged.into_iter() {
            let after = updated.to_attribute_map();
            if before == after {
                continue;
            }
            log.record(ChangeEvent::modify(
                ObjectType::Link,
                updated.id.as_str(),
                before,
                after,
            ));
            changed.push(updated.id.clone());
            self.links.insert(updated.id.clone(), updated);
        }
        changed
    }

    fn check_link_endpoints(&self, link: &LinkData) -> Result<(), GraphError> {
        for (side, node) in [("from", &link.from), ("to", &link.to)] {
            if !self.contains_node(node) {
                return Err(GraphError::DanglingLinkReference {
                    link: link.id.clone(),
                    side,
                    node: node.clone(),
                });
            }
        }
        Ok(())
    }

    fn insert_node(
        &mut self,
        mut node: NodeData,
        generator: &mut Option<IdGenerator>,
        log: &mut dyn ChangeLogSink,
    ) -> NodeId {
        let proposed = node.id.clone();
        if self.nodes.contains_key(&proposed) {
            let nodes = &self.nodes;
            let generator = generator.get_or_insert_with(|| {
                IdGenerator::from_existing(nodes.keys().map(|n| n.as_str()))
            });
            let fresh = generator.next_free(|c| nodes.contains_key(&NodeId::from(c)));
            log::debug!("node id '{proposed}' taken, reindexed to '{fresh}'");
            node.id = NodeId::from(fresh);
        }
        if self.projection.is_geographic() && node.lon.is_none() && node.lat.is_none() {
            node.lon = Some(node.x);
            node.lat = Some(node.y);
        }
        if node.spatial_token.is_none() {
            if let (Some(lon), Some(lat)) = (node.lon, node.lat) {
                node.spatial_token = super::spatial_token(lon, lat, self.token_resolution);
            }
        }
        log.record(ChangeEvent::add(
            ObjectType::Node,
            Some(proposed.as_str()),
            node.id.as_str(),
            node.to_attribute_map(),
        ));
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        id
    }

    /// endpoints must already have been checked.
    fn insert_link(
        &mut self,
        mut link: LinkData,
        multi_index: Option<usize>,
        generator: &mut Option<IdGenerator>,
        log: &mut dyn ChangeLogSink,
    ) -> LinkId {
        let proposed = link.id.clone();
        if self.links.contains_key(&proposed) {
            let links = &self.links;
            let generator = generator.get_or_insert_with(|| {
                IdGenerator::from_existing(links.keys().map(|l| l.as_str()))
            });
            let fresh = generator.next_free(|c| links.contains_key(&LinkId::from(c)));
            log::debug!("link id '{proposed}' taken, reindexed to '{fresh}'");
            link.id = LinkId::from(fresh);
        }
        if link.length.is_none() {
            if let (Some(src), Some(dst)) = (self.nodes.get(&link.from), self.nodes.get(&link.to))
            {
                link.length = Some(self.projection.distance(src.point(), dst.point()));
            }
        }
        let occupied = self.multiedges.get(&(link.from.clone(), link.to.clone()));
        let slot = match (multi_index, occupied) {
            (Some(k), Some(m)) if !m.contains_key(&k) => k,
            (Some(k), None) => k,
            (_, Some(m)) => m.keys().next_back().map(|k| k + 1).unwrap_or(0),
            (None, None) => 0,
        };
        log.record(ChangeEvent::add(
            ObjectType::Link,
            Some(proposed.as_str()),
            link.id.as_str(),
            link.to_attribute_map(),
        ));
        let id = link.id.clone();
        self.attach_link(link, slot);
        id
    }

    /// writes a link into every index without logging.
    fn attach_link(&mut self, link: LinkData, slot: usize) {
        let id = link.id.clone();
        self.multiedges
            .entry((link.from.clone(), link.to.clone()))
            .or_default()
            .insert(slot, id.clone());
        self.adj
            .entry((link.from.clone(), Dir::Forward))
            .or_default()
            .insert(link.to.clone());
        self.adj
            .entry((link.to.clone(), Dir::Reverse))
            .or_default()
            .insert(link.from.clone());
        self.slots.insert(id.clone(), slot);
        self.links.insert(id, link);
    }

    /// removes a link from every index without logging.
    fn detach_link(&mut self, link_id: &LinkId) -> Result<LinkData, GraphError> {
        let link = self
            .links
            .shift_remove(link_id)
            .ok_or_else(|| GraphError::MissingLink(link_id.clone()))?;
        let slot = self.slots.remove(link_id);
        let od = (link.from.clone(), link.to.clone());
        let pair_empty = match (self.multiedges.get_mut(&od), slot) {
            (Some(multiedges), Some(k)) => {
                multiedges.remove(&k);
                multiedges.is_empty()
            }
            _ => {
                return Err(GraphError::InconsistentIndex(format!(
                    "link '{link_id}' not found in multiedge index"
                )))
            }
        };
        if pair_empty {
            self.multiedges.remove(&od);
            remove_adjacency(&mut self.adj, &link.from, &link.to, Dir::Forward);
            remove_adjacency(&mut self.adj, &link.to, &link.from, Dir::Reverse);
        }
        Ok(link)
    }
}

fn remove_adjacency(adj: &mut AdjacencyList, src: &NodeId, dst: &NodeId, dir: Dir) {
    let key = (src.clone(), dir);
    let now_empty = match adj.get_mut(&key) {
        Some(neighbors) => {
            neighbors.remove(dst);
            neighbors.is_empty()
        }
        None => false,
    };
    if now_empty {
        adj.remove(&key);
    }
}

/// node ids having at least one incident link.
pub fn connected_node_ids(graph: &SpatialGraph) -> HashSet<&NodeId> {
    graph
        .links()
        .flat_map(|l| [&l.from, &l.to])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::SpatialGraph;
    use crate::model::{
        attribute::{AttributeCondition, AttributeMap, AttributeValue as V, ConditionSet, MatchMode},
        change_log::{ChangeLog, ChangeType, DiscardChanges, ObjectType},
        graph::{GraphError, LinkData, LinkId, NodeData, NodeId, Projection},
    };
    use indexmap::IndexMap;

    fn planar() -> Projection {
        Projection::Planar(String::from("epsg:27700"))
    }

    fn two_node_graph(log: &mut ChangeLog) -> SpatialGraph {
        let mut graph = SpatialGraph::new(planar());
        graph.add_node(NodeData::new("A", 0.0, 0.0), log);
        graph.add_node(NodeData::new("B", 3.0, 4.0), log);
        graph
    }

    #[test]
    fn test_duplicate_link_id_is_reindexed() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        let first = graph
            .add_link(LinkData::new("1", "A", "B", &["car"]), None, &mut log)
            .unwrap();
        let second = graph
            .add_link(LinkData::new("1", "A", "B", &["car"]), None, &mut log)
            .unwrap();
        assert_eq!(first, LinkId::from("1"));
        assert_ne!(first, second);
        assert_eq!(graph.n_links(), 2);
        assert_eq!(
            graph
                .links_between(&NodeId::from("A"), &NodeId::from("B"))
                .len(),
            2
        );
        let last = log.last().unwrap();
        assert_eq!(last.change_event, ChangeType::Add);
        assert_eq!(last.object_type, ObjectType::Link);
        assert!(last.was_reindexed());
        assert_eq!(last.old_id.as_deref(), Some("1"));
        assert_eq!(last.new_id.as_deref(), Some(second.as_str()));
        graph.verify_dual_index().unwrap();
    }

    #[test]
    fn test_add_links_batch_reindex_map() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph
            .add_link(LinkData::new("1", "A", "B", &["car"]), None, &mut log)
            .unwrap();
        let (reindexed, committed) = graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["bus"]),
                    LinkData::new("2", "B", "A", &["car"]),
                    LinkData::new("2", "B", "A", &["walk"]),
                ],
                &mut log,
            )
            .unwrap();
        assert_eq!(committed.len(), 3);
        assert_eq!(graph.n_links(), 4);
        assert_eq!(reindexed.len(), 2);
        assert!(reindexed.contains_key(&LinkId::from("1")));
        assert!(reindexed.contains_key(&LinkId::from("2")));
        let ids = graph.link_ids().cloned().collect::<std::collections::HashSet<_>>();
        assert_eq!(ids.len(), 4);
        graph.verify_dual_index().unwrap();
    }

    #[test]
    fn test_add_links_fails_before_mutation_on_missing_node() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        let result = graph.add_links(
            vec![
                LinkData::new("1", "A", "B", &["car"]),
                LinkData::new("2", "B", "Z", &["car"]),
            ],
            &mut log,
        );
        assert!(matches!(
            result,
            Err(GraphError::DanglingLinkReference { side: "to", .. })
        ));
        assert_eq!(graph.n_links(), 0);
    }

    #[test]
    fn test_occupied_multi_index_is_replaced() {
        let mut graph = SpatialGraph::new(planar());
        graph.add_node(NodeData::new("A", 0.0, 0.0), &mut DiscardChanges);
        graph.add_node(NodeData::new("B", 1.0, 0.0), &mut DiscardChanges);
        let a = graph
            .add_link(LinkData::new("a", "A", "B", &["car"]), Some(0), &mut DiscardChanges)
            .unwrap();
        let b = graph
            .add_link(LinkData::new("b", "A", "B", &["car"]), Some(0), &mut DiscardChanges)
            .unwrap();
        assert_eq!(graph.link_slot(&a).unwrap().multi_index, 0);
        assert_eq!(graph.link_slot(&b).unwrap().multi_index, 1);
    }

    #[test]
    fn test_length_computed_when_absent() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        let id = graph
            .add_link(LinkData::new("1", "A", "B", &["car"]), None, &mut log)
            .unwrap();
        assert_eq!(graph.link(&id).unwrap().length, Some(5.0));
        let id = graph
            .add_link(
                LinkData::new("2", "A", "B", &["car"]).with_length(12.0),
                None,
                &mut log,
            )
            .unwrap();
        assert_eq!(graph.link(&id).unwrap().length, Some(12.0));
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph.add_node(NodeData::new("C", 1.0, 1.0), &mut log);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car"]),
                    LinkData::new("2", "B", "A", &["car"]),
                    LinkData::new("3", "A", "C", &["car"]),
                ],
                &mut log,
            )
            .unwrap();
        let before = log.len();
        graph.remove_node(&NodeId::from("B"), &mut log).unwrap();
        assert_eq!(graph.n_links(), 1);
        assert_eq!(graph.n_nodes(), 2);
        assert_eq!(log.len(), before + 3);
        assert_eq!(graph.successors(&NodeId::from("A")).count(), 1);
        assert_eq!(graph.predecessors(&NodeId::from("A")).count(), 0);
        graph.verify_dual_index().unwrap();
    }

    #[test]
    fn test_remove_links_unknown_id_fails_first() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph
            .add_link(LinkData::new("1", "A", "B", &["car"]), None, &mut log)
            .unwrap();
        let result = graph.remove_links(&[LinkId::from("1"), LinkId::from("9")], &mut log);
        assert!(result.is_err());
        assert_eq!(graph.n_links(), 1);
    }

    #[test]
    fn test_modal_subgraph() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph.add_node(NodeData::new("C", 1.0, 1.0), &mut log);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car", "bus"]),
                    LinkData::new("2", "B", "C", &["walk"]),
                ],
                &mut log,
            )
            .unwrap();
        let sub = graph.modal_subgraph(&["bus"]);
        assert_eq!(sub.n_links(), 1);
        assert_eq!(sub.n_nodes(), 2);
        assert!(!sub.contains_node(&NodeId::from("C")));
        sub.verify_dual_index().unwrap();
    }

    #[test]
    fn test_apply_attributes_with_conditions() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph
            .add_links(
                vec![
                    LinkData::new("1", "A", "B", &["car"]),
                    LinkData::new("2", "B", "A", &["bus"]),
                ],
                &mut log,
            )
            .unwrap();
        let before = log.len();
        let update = AttributeMap::from([(String::from("freespeed"), V::Float(20.0))]);
        let mapping = IndexMap::from([
            (LinkId::from("1"), update.clone()),
            (LinkId::from("2"), update.clone()),
            (LinkId::from("404"), update),
        ]);
        let conditions =
            ConditionSet::new(MatchMode::All).with("modes", AttributeCondition::equals("car"));
        let changed = graph
            .apply_attributes_to_links(&mapping, Some(&conditions), &mut log)
            .unwrap();
        assert_eq!(changed, vec![LinkId::from("1")]);
        assert_eq!(graph.link(&LinkId::from("1")).unwrap().freespeed, Some(20.0));
        assert_eq!(graph.link(&LinkId::from("2")).unwrap().freespeed, None);
        assert_eq!(log.len(), before + 1);
        let event = log.last().unwrap();
        assert_eq!(event.change_event, ChangeType::Modify);
        assert!(event.diff.iter().any(|d| d.path == "freespeed"));
    }

    #[test]
    fn test_apply_attributes_rejects_identity_change() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph
            .add_link(LinkData::new("1", "A", "B", &["car"]), None, &mut log)
            .unwrap();
        let mapping = IndexMap::from([(
            LinkId::from("1"),
            AttributeMap::from([(String::from("to"), V::from("A"))]),
        )]);
        let result = graph.apply_attributes_to_links(&mapping, None, &mut log);
        assert!(matches!(result, Err(GraphError::AttributeError(_, _))));
    }

    #[test]
    fn test_apply_function_to_links() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        graph
            .add_link(
                LinkData::new("1", "A", "B", &["car"])
                    .with_length(100.0)
                    .with_freespeed(10.0),
                None,
                &mut log,
            )
            .unwrap();
        graph
            .apply_function_to_links(|l| Some(V::Float(l.travel_time())), "travel_time", &mut log)
            .unwrap();
        let link = graph.link(&LinkId::from("1")).unwrap();
        assert_eq!(link.attributes["travel_time"], V::Float(10.0));
    }

    #[test]
    fn test_apply_function_to_nodes_then_extract() {
        let mut log = ChangeLog::new();
        let mut graph = two_node_graph(&mut log);
        let before = log.len();
        let changed = graph
            .apply_function_to_nodes(|n| (n.x > 1.0).then(|| V::from("east")), "side", &mut log)
            .unwrap();
        assert_eq!(changed, vec![NodeId::from("B")]);
        assert_eq!(log.len(), before + 1);

        let conditions = ConditionSet::new(MatchMode::All).with(
            "attributes",
            AttributeCondition::nested("side", AttributeCondition::equals("east")),
        );
        assert_eq!(graph.extract_nodes_on_attributes(&conditions), vec![NodeId::from("B")]);
        let none = ConditionSet::new(MatchMode::All)
            .with("x", AttributeCondition::Within { lower: 10.0, upper: 20.0 });
        assert!(graph.extract_nodes_on_attributes(&none).is_empty());
    }

    #[test]
    fn test_wgs84_nodes_get_spatial_token() {
        let mut graph = SpatialGraph::new(Projection::Wgs84);
        let id = graph.add_node(NodeData::new("1", -0.1276, 51.5072), &mut DiscardChanges);
        let node = graph.node(&id).unwrap();
        assert_eq!(node.lon, Some(-0.1276));
        assert!(node.spatial_token.is_some());
    }
}
