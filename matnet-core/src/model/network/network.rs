use super::NetworkError;
use crate::{
    algorithm::{
        merge::merge_graphs,
        search::{shortest_path, ShortestPath},
        simplification::simplify_graph,
    },
    model::{
        attribute::{AttributeMap, ConditionSet},
        change_log::{ChangeEvent, ChangeLog, ChangeLogSink, ObjectType},
        graph::{LinkData, LinkId, NodeData, NodeId, SpatialGraph},
        schedule::{Route, Schedule, ScheduleError, StopId},
    },
};
use indexmap::{map::Entry, IndexMap};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// a multimodal graph together with the optional public transport schedule that
/// runs on it. every mutation applied through the network is recorded in its
/// change log.
#[derive(Debug, Clone, Default)]
pub struct Network {
    graph: SpatialGraph,
    schedule: Option<Schedule>,
    change_log: ChangeLog,
    simplified: bool,
    link_simplification_map: IndexMap<LinkId, LinkId>,
}

/// id mappings produced by [`Network::add`], from the added network's ids to the
/// ids committed in the receiving network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeSummary {
    pub node_mapping: HashMap<NodeId, NodeId>,
    pub link_mapping: HashMap<LinkId, LinkId>,
}

impl Network {
    pub fn new(graph: SpatialGraph) -> Network {
        Network {
            graph,
            ..Default::default()
        }
    }

    /// builds a network without checking that the schedule references exist in
    /// the graph. use [`Network::verify_referential_integrity`] or validation to
    /// inspect such data.
    pub fn with_schedule(graph: SpatialGraph, schedule: Schedule) -> Network {
        Network {
            graph,
            schedule: Some(schedule),
            ..Default::default()
        }
    }

    /// marks a network loaded from an earlier simplified state, along with the
    /// original link id mapping produced by that simplification.
    pub fn with_simplification(mut self, mapping: IndexMap<LinkId, LinkId>) -> Network {
        self.simplified = true;
        self.link_simplification_map = mapping;
        self
    }

    /// sets the schedule of this network after checking every stop and route
    /// reference against the graph. the network is unchanged on failure.
    pub fn attach_schedule(&mut self, schedule: Schedule) -> Result<(), NetworkError> {
        check_schedule_references(&self.graph, &schedule)?;
        self.schedule = Some(schedule);
        Ok(())
    }

    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    pub fn is_simplified(&self) -> bool {
        self.simplified
    }

    /// original link id -> id of the simplified link replacing it
    pub fn link_simplification_map(&self) -> &IndexMap<LinkId, LinkId> {
        &self.link_simplification_map
    }

    pub fn add_node(&mut self, node: NodeData) -> NodeId {
        self.graph.add_node(node, &mut self.change_log)
    }

    pub fn add_link(&mut self, link: LinkData) -> Result<LinkId, NetworkError> {
        Ok(self.graph.add_link(link, None, &mut self.change_log)?)
    }

    /// removes links, refusing those still referenced by the schedule.
    pub fn remove_links(&mut self, link_ids: &[LinkId]) -> Result<Vec<LinkData>, NetworkError> {
        if let Some(schedule) = &self.schedule {
            let referenced = schedule.referenced_link_ids();
            if let Some(used) = link_ids.iter().find(|id| referenced.contains(id)) {
                return Err(NetworkError::LinkInUse(used.clone()));
            }
        }
        Ok(self.graph.remove_links(link_ids, &mut self.change_log)?)
    }

    /// removes nodes and their incident links, refusing when any of those links is
    /// still referenced by the schedule.
    pub fn remove_nodes(&mut self, node_ids: &[NodeId]) -> Result<(), NetworkError> {
        if let Some(schedule) = &self.schedule {
            let referenced = schedule.referenced_link_ids();
            for node_id in node_ids.iter() {
                self.graph.node(node_id)?;
                let incident = self
                    .graph
                    .out_links(node_id)
                    .into_iter()
                    .chain(self.graph.in_links(node_id))
                    .find(|l| referenced.contains(&l.id));
                if let Some(link) = incident {
                    return Err(NetworkError::LinkInUse(link.id.clone()));
                }
            }
        }
        self.graph.remove_nodes(node_ids, &mut self.change_log)?;
        Ok(())
    }

    pub fn apply_attributes_to_nodes(
        &mut self,
        mapping: &IndexMap<NodeId, AttributeMap>,
        conditions: Option<&ConditionSet>,
    ) -> Result<Vec<NodeId>, NetworkError> {
        Ok(self
            .graph
            .apply_attributes_to_nodes(mapping, conditions, &mut self.change_log)?)
    }

    pub fn apply_attributes_to_links(
        &mut self,
        mapping: &IndexMap<LinkId, AttributeMap>,
        conditions: Option<&ConditionSet>,
    ) -> Result<Vec<LinkId>, NetworkError> {
        Ok(self
            .graph
            .apply_attributes_to_links(mapping, conditions, &mut self.change_log)?)
    }

    /// updates stops of the schedule. a network without a schedule changes nothing.
    pub fn apply_attributes_to_stops(
        &mut self,
        mapping: &IndexMap<StopId, AttributeMap>,
    ) -> Result<Vec<StopId>, NetworkError> {
        match self.schedule.as_mut() {
            Some(schedule) => Ok(schedule.apply_attributes_to_stops(mapping, &mut self.change_log)?),
            None => Ok(vec![]),
        }
    }

    /// shortest path between two nodes, searched over `subgraph` when given and
    /// over the whole graph otherwise.
    pub fn find_shortest_path(
        &self,
        from: &NodeId,
        to: &NodeId,
        modes: Option<&[&str]>,
        subgraph: Option<&SpatialGraph>,
    ) -> Result<Option<ShortestPath>, NetworkError> {
        let graph = subgraph.unwrap_or(&self.graph);
        Ok(shortest_path(graph, from, to, modes)?)
    }

    /// merges chains of links between endpoint nodes into single links and
    /// rewrites every schedule reference to the new links.
    ///
    /// # Returns
    ///
    /// the mapping from each replaced link id to its simplified link id
    pub fn simplify(&mut self, workers: usize) -> Result<IndexMap<LinkId, LinkId>, NetworkError> {
        if self.simplified {
            return Err(NetworkError::AlreadySimplified);
        }
        let mapping = simplify_graph(&mut self.graph, workers, &mut self.change_log)?;
        if let Some(schedule) = self.schedule.as_mut() {
            let n_routes =
                remap_schedule_links(schedule, |l| mapping.get(l).cloned(), &mut self.change_log);
            log::info!("simplify: rewrote link references of {n_routes} routes");
        }
        self.simplified = true;
        self.link_simplification_map = mapping.clone();
        Ok(mapping)
    }

    /// adds another network to this one.
    ///
    /// nodes at the same location are shared and links joining the same nodes with
    /// the same modes are shared. other nodes and links are added, taking fresh
    /// ids where they collide. services are appended with their stop and route
    /// link references remapped. nothing is changed if the projections differ,
    /// if only one of the networks is simplified, if the added schedule repeats a
    /// service id or if the schedules share a service id.
    pub fn add(&mut self, other: Network) -> Result<MergeSummary, NetworkError> {
        if self.graph.projection() != other.graph.projection() {
            return Err(NetworkError::ProjectionMismatch {
                expected: self.graph.projection().clone(),
                found: other.graph.projection().clone(),
            });
        }
        if self.simplified != other.simplified {
            return Err(NetworkError::SimplificationMismatch);
        }
        if let Some(theirs) = &other.schedule {
            if let Some(repeated) = theirs.services.iter().map(|s| &s.id).duplicates().next() {
                return Err(ScheduleError::DuplicateService(repeated.clone()).into());
            }
        }
        if let (Some(ours), Some(theirs)) = (&self.schedule, &other.schedule) {
            let overlapping = theirs
                .services
                .iter()
                .filter(|s| ours.service(&s.id).is_some())
                .map(|s| s.id.clone())
                .collect_vec();
            if !overlapping.is_empty() {
                return Err(NetworkError::OverlappingServices(overlapping));
            }
        }

        let Network {
            graph: other_graph,
            schedule: other_schedule,
            change_log: other_log,
            link_simplification_map: other_simplification,
            ..
        } = other;

        // work on copies, committed only once every step has succeeded
        let mut graph = self.graph.clone();
        let mut schedule = self.schedule.clone();
        let mut change_log = self.change_log.clone();
        let mut simplification = self.link_simplification_map.clone();

        change_log.absorb(other_log);
        let merge = merge_graphs(&mut graph, &other_graph, &mut change_log)?;

        for (original, simplified) in other_simplification.into_iter() {
            let mapped = merge.link_mapping.get(&simplified).cloned().unwrap_or(simplified);
            simplification.entry(original).or_insert(mapped);
        }

        if let Some(mut theirs) = other_schedule {
            remap_schedule_links(
                &mut theirs,
                |l| merge.link_mapping.get(l).cloned(),
                &mut change_log,
            );
            let ours = schedule.get_or_insert_with(|| Schedule::new(theirs.projection.clone(), vec![]));
            for service in theirs.services.into_iter() {
                ours.add_service(service, &mut change_log)?;
            }
            for (id, vehicle_type) in theirs.vehicle_types.into_iter() {
                ours.vehicle_types.entry(id).or_insert(vehicle_type);
            }
            for (id, vehicle) in theirs.vehicles.into_iter() {
                if let Entry::Vacant(entry) = ours.vehicles.entry(id) {
                    change_log.record(ChangeEvent::add(
                        ObjectType::Vehicle,
                        None,
                        entry.key(),
                        vehicle.to_attribute_map(entry.key()),
                    ));
                    entry.insert(vehicle);
                }
            }
            ours.minimal_transfer_times
                .extend(theirs.minimal_transfer_times);
        }

        self.graph = graph;
        self.schedule = schedule;
        self.change_log = change_log;
        self.link_simplification_map = simplification;
        Ok(MergeSummary {
            node_mapping: merge.node_mapping,
            link_mapping: merge.link_mapping,
        })
    }

    /// checks every stop and route reference of the schedule against the graph,
    /// returning the first violation found.
    pub fn verify_referential_integrity(&self) -> Result<(), NetworkError> {
        match &self.schedule {
            Some(schedule) => check_schedule_references(&self.graph, schedule),
            None => Ok(()),
        }
    }

    /// true when the route's network route is not empty, exists in the graph, is
    /// contiguous and permits the route's mode on every link.
    pub fn route_network_route_is_valid(&self, route: &Route) -> bool {
        !route.network_route.is_empty() && check_network_route(&self.graph, route).is_ok()
    }

    /// routes of the schedule whose network route is not valid, as
    /// (service id, route id) pairs.
    pub fn invalid_network_routes(&self) -> Vec<(String, String)> {
        match &self.schedule {
            Some(schedule) => schedule
                .routes()
                .filter(|(_, r)| !self.route_network_route_is_valid(r))
                .map(|(s, r)| (s.id.clone(), r.id.clone()))
                .collect(),
            None => vec![],
        }
    }

    /// total length of the links along the route's network route.
    pub fn route_length(&self, route: &Route) -> Result<f64, NetworkError> {
        route.network_route.iter().try_fold(0.0, |acc, link_id| {
            let link = self.graph.link(link_id)?;
            Ok(acc + link.length.unwrap_or(0.0))
        })
    }
}

fn check_schedule_references(graph: &SpatialGraph, schedule: &Schedule) -> Result<(), NetworkError> {
    for (_, route) in schedule.routes() {
        for stop in route.stops.iter() {
            if let Some(link) = &stop.link_ref_id {
                if !graph.contains_link(link) {
                    return Err(NetworkError::MissingStopLink {
                        stop: stop.id.clone(),
                        link: link.clone(),
                    });
                }
            }
        }
        check_network_route(graph, route)?;
    }
    Ok(())
}

fn check_network_route(graph: &SpatialGraph, route: &Route) -> Result<(), NetworkError> {
    let links = route
        .network_route
        .iter()
        .map(|link_id| {
            graph
                .link(link_id)
                .map_err(|_| NetworkError::MissingRouteLink {
                    route: route.id.clone(),
                    link: link_id.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(link) = links.iter().find(|l| !l.permits(&route.mode)) {
        return Err(NetworkError::ModeIncompatible {
            route: route.id.clone(),
            mode: route.mode.clone(),
            link: link.id.clone(),
        });
    }
    if let Some((a, b)) = links.iter().tuple_windows().find(|(a, b)| a.to != b.from) {
        return Err(NetworkError::DisconnectedRoute {
            route: route.id.clone(),
            from: a.id.clone(),
            to: b.id.clone(),
        });
    }
    Ok(())
}

/// rewrites stop and network route link references through `remap`, leaving
/// unmapped ids as they are. consecutive repeats in a network route collapse.
/// each route and each stop whose references change is logged once as modified.
/// returns the number of routes changed.
fn remap_schedule_links<F>(schedule: &mut Schedule, remap: F, log: &mut dyn ChangeLogSink) -> usize
where
    F: Fn(&LinkId) -> Option<LinkId>,
{
    let mut changed = 0;
    let mut logged_stops: HashSet<StopId> = HashSet::new();
    for route in schedule.routes_mut() {
        let before = route.to_attribute_map();
        for stop in route.stops.iter_mut() {
            let Some(new_id) = stop.link_ref_id.as_ref().and_then(&remap) else {
                continue;
            };
            if stop.link_ref_id.as_ref() == Some(&new_id) {
                continue;
            }
            let stop_before = stop.to_attribute_map();
            stop.link_ref_id = Some(new_id);
            if logged_stops.insert(stop.id.clone()) {
                log.record(ChangeEvent::modify(
                    ObjectType::Stop,
                    stop.id.as_str(),
                    stop_before,
                    stop.to_attribute_map(),
                ));
            }
        }
        let mut network_route = route
            .network_route
            .iter()
            .map(|l| remap(l).unwrap_or_else(|| l.clone()))
            .collect_vec();
        network_route.dedup();
        route.network_route = network_route;
        let after = route.to_attribute_map();
        if before != after {
            log.record(ChangeEvent::modify(ObjectType::Route, &route.id, before, after));
            changed += 1;
        }
    }
    changed
}
