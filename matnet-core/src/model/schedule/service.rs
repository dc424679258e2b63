use super::{Route, ServiceStage, StopGraph, Validity};
use crate::model::attribute::{AttributeMap, AttributeValue};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// a named group of routes, such as one line in both directions. duplicate
/// route ids are reported by validation rather than rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub routes: Vec<Route>,
}

impl Service {
    pub fn new(id: &str, routes: Vec<Route>) -> Service {
        Service {
            id: id.to_string(),
            name: String::new(),
            routes,
        }
    }

    pub fn route(&self, route_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == route_id)
    }

    pub fn to_attribute_map(&self) -> AttributeMap {
        AttributeMap::from([
            (String::from("id"), AttributeValue::from(self.id.as_str())),
            (String::from("name"), AttributeValue::from(self.name.as_str())),
            (
                String::from("routes"),
                AttributeValue::List(
                    self.routes
                        .iter()
                        .map(|r| AttributeValue::from(r.id.as_str()))
                        .collect(),
                ),
            ),
        ])
    }

    pub fn is_valid_service(&self) -> Validity<ServiceStage> {
        let mut failures = vec![];
        if !self.invalid_routes().is_empty() {
            failures.push(ServiceStage::NotHasValidRoutes);
        }
        if !self.has_uniquely_indexed_routes() {
            failures.push(ServiceStage::NotHasUniquelyIndexedRoutes);
        }
        Validity::from_failures(failures)
    }

    /// ids of routes failing [`Route::is_valid_route`].
    pub fn invalid_routes(&self) -> Vec<String> {
        self.routes
            .iter()
            .filter(|r| !r.is_valid_route().is_valid)
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn has_uniquely_indexed_routes(&self) -> bool {
        self.routes.iter().map(|r| &r.id).all_unique()
    }

    pub fn graph(&self) -> StopGraph {
        let mut graph = StopGraph::default();
        for route in self.routes.iter() {
            graph.add_route(route, Some(&self.id));
        }
        graph
    }

    pub fn is_strongly_connected(&self) -> bool {
        self.graph().is_strongly_connected()
    }
}
