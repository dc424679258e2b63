use super::{Route, Stop, StopId};
use crate::algorithm::components::strongly_connected_components;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// routes and services contributing a stop-to-stop edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopEdge {
    pub routes: BTreeSet<String>,
    pub services: BTreeSet<String>,
}

/// directed graph of stop-to-stop connections implied by route stop orderings.
/// derived on demand from a route, service or schedule and only read from.
#[derive(Debug, Clone, Default)]
pub struct StopGraph {
    stops: IndexMap<StopId, Stop>,
    edges: IndexMap<(StopId, StopId), StopEdge>,
}

impl StopGraph {
    pub fn add_route(&mut self, route: &Route, service_id: Option<&str>) {
        for stop in route.stops.iter() {
            if !self.stops.contains_key(&stop.id) {
                self.stops.insert(stop.id.clone(), stop.clone());
            }
        }
        for (a, b) in route.stops.iter().tuple_windows() {
            let edge = self.edges.entry((a.id.clone(), b.id.clone())).or_default();
            edge.routes.insert(route.id.clone());
            if let Some(service_id) = service_id {
                edge.services.insert(service_id.to_string());
            }
        }
    }

    pub fn n_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub fn edge(&self, from: &StopId, to: &StopId) -> Option<&StopEdge> {
        self.edges.get(&(from.clone(), to.clone()))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&StopId, &StopId, &StopEdge)> {
        self.edges.iter().map(|((a, b), e)| (a, b, e))
    }

    pub fn successors(&self, stop_id: &StopId) -> Vec<StopId> {
        self.edges
            .keys()
            .filter(|(a, _)| a == stop_id)
            .map(|(_, b)| b.clone())
            .collect()
    }

    pub fn strongly_connected_components(&self) -> Vec<Vec<StopId>> {
        let mut adjacency: IndexMap<StopId, Vec<StopId>> = IndexMap::new();
        for (a, b) in self.edges.keys() {
            adjacency.entry(a.clone()).or_default().push(b.clone());
        }
        let nodes = self.stops.keys().cloned().collect_vec();
        strongly_connected_components(&nodes, |s| {
            adjacency.get(s).cloned().unwrap_or_default()
        })
    }

    /// true iff one strongly connected component covers every stop.
    pub fn is_strongly_connected(&self) -> bool {
        !self.stops.is_empty() && self.strongly_connected_components().len() == 1
    }
}
