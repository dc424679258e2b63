use super::{
    MinimalTransferTime, Route, ScheduleError, ScheduleStage, Service, Stop, StopGraph, StopId,
    StopSpeed, Validity, Vehicle, VehicleDiagnostics, VehicleType,
};
use crate::model::{
    attribute::AttributeMap,
    change_log::{ChangeEvent, ChangeLogSink, ObjectType},
    graph::{LinkId, Projection},
};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// the public transport schedule: services, their routes and stops, along with
/// transfer times and the vehicle registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub projection: Projection,
    pub services: Vec<Service>,
    #[serde(default)]
    pub minimal_transfer_times: Vec<MinimalTransferTime>,
    #[serde(default)]
    pub vehicles: IndexMap<String, Vehicle>,
    #[serde(default)]
    pub vehicle_types: IndexMap<String, VehicleType>,
}

impl Schedule {
    pub fn new(projection: Projection, services: Vec<Service>) -> Schedule {
        Schedule {
            projection,
            services,
            minimal_transfer_times: vec![],
            vehicles: IndexMap::new(),
            vehicle_types: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }

    /// first route with the given id along with its service.
    pub fn route(&self, route_id: &str) -> Option<(&Service, &Route)> {
        self.routes().find(|(_, r)| r.id == route_id)
    }

    pub fn routes(&self) -> impl Iterator<Item = (&Service, &Route)> {
        self.services
            .iter()
            .flat_map(|s| s.routes.iter().map(move |r| (s, r)))
    }

    pub fn routes_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.services.iter_mut().flat_map(|s| s.routes.iter_mut())
    }

    /// every distinct stop, by id, as first encountered.
    pub fn stops(&self) -> IndexMap<&StopId, &Stop> {
        let mut stops = IndexMap::new();
        for (_, route) in self.routes() {
            for stop in route.stops.iter() {
                stops.entry(&stop.id).or_insert(stop);
            }
        }
        stops
    }

    pub fn stop(&self, stop_id: &StopId) -> Option<&Stop> {
        self.routes()
            .flat_map(|(_, r)| r.stops.iter())
            .find(|s| &s.id == stop_id)
    }

    pub fn modes(&self) -> BTreeSet<String> {
        self.routes().map(|(_, r)| r.mode.clone()).collect()
    }

    pub fn n_trips(&self) -> usize {
        self.routes().map(|(_, r)| r.n_trips()).sum()
    }

    /// link ids referenced by stops or network routes.
    pub fn referenced_link_ids(&self) -> BTreeSet<&LinkId> {
        self.routes()
            .flat_map(|(_, r)| {
                r.stops
                    .iter()
                    .filter_map(|s| s.link_ref_id.as_ref())
                    .chain(r.network_route.iter())
            })
            .collect()
    }

    pub fn is_valid_schedule(&self) -> Validity<ScheduleStage> {
        let mut failures = vec![];
        if !self.invalid_services().is_empty() {
            failures.push(ScheduleStage::NotHasValidServices);
        }
        if !self.has_uniquely_indexed_services() {
            failures.push(ScheduleStage::NotHasUniquelyIndexedServices);
        }
        Validity::from_failures(failures)
    }

    pub fn invalid_services(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|s| !s.is_valid_service().is_valid)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn has_uniquely_indexed_services(&self) -> bool {
        self.services.iter().map(|s| &s.id).all_unique()
    }

    pub fn graph(&self) -> StopGraph {
        let mut graph = StopGraph::default();
        for (service, route) in self.routes() {
            graph.add_route(route, Some(&service.id));
        }
        graph
    }

    /// diagnostic only: a schedule may be valid without being strongly connected.
    pub fn is_strongly_connected(&self) -> bool {
        self.graph().is_strongly_connected()
    }

    /// (service id, route id) of routes with two trips departing in the same minute.
    pub fn routes_with_zero_headways(&self) -> Vec<(String, String)> {
        self.routes()
            .filter(|(_, r)| r.headway_stats().is_some_and(|h| h.has_zero_headway()))
            .map(|(s, r)| (s.id.clone(), r.id.clone()))
            .collect()
    }

    /// speeds between consecutive stops of every route, by (service id, route id).
    pub fn route_speeds(&self) -> Vec<((String, String), Vec<StopSpeed>)> {
        self.routes()
            .map(|(s, r)| ((s.id.clone(), r.id.clone()), r.speeds(&self.projection)))
            .collect()
    }

    pub fn routes_with_zero_speeds(&self) -> Vec<(String, String)> {
        self.routes_with_speed_matching(|speed| speed == 0.0)
    }

    pub fn routes_with_infinite_speeds(&self) -> Vec<(String, String)> {
        self.routes_with_speed_matching(f64::is_infinite)
    }

    fn routes_with_speed_matching<F>(&self, f: F) -> Vec<(String, String)>
    where
        F: Fn(f64) -> bool,
    {
        self.route_speeds()
            .into_iter()
            .filter(|(_, speeds)| speeds.iter().any(|s| f(s.speed)))
            .map(|(key, _)| key)
            .collect()
    }

    pub fn vehicle_diagnostics(&self) -> VehicleDiagnostics {
        VehicleDiagnostics::from_schedule(self)
    }

    /// adds a service, failing if its id is already used.
    pub fn add_service(
        &mut self,
        service: Service,
        log: &mut dyn ChangeLogSink,
    ) -> Result<(), ScheduleError> {
        if self.service(&service.id).is_some() {
            return Err(ScheduleError::DuplicateService(service.id));
        }
        log.record(ChangeEvent::add(
            ObjectType::Service,
            None,
            &service.id,
            service.to_attribute_map(),
        ));
        self.services.push(service);
        Ok(())
    }

    /// updates every copy of each listed stop. unknown stops are skipped and all
    /// updates are checked before any is applied. returns the stops changed.
    pub fn apply_attributes_to_stops(
        &mut self,
        mapping: &IndexMap<StopId, AttributeMap>,
        log: &mut dyn ChangeLogSink,
    ) -> Result<Vec<StopId>, ScheduleError> {
        let mut staged: Vec<(AttributeMap, Stop)> = vec![];
        {
            let stops = self.stops();
            for (stop_id, attributes) in mapping.iter() {
                let Some(stop) = stops.get(stop_id) else {
                    log::warn!("stop '{stop_id}' not in schedule, skipping attribute update");
                    continue;
                };
                let mut updated = (*stop).clone();
                for (key, value) in attributes.iter() {
                    updated
                        .set_attribute(key, value.clone())
                        .map_err(|e| ScheduleError::AttributeError(stop_id.to_string(), e))?;
                }
                staged.push((stop.to_attribute_map(), updated));
            }
        }
        let mut changed = vec![];
        for (before, updated) in staged.into_iter() {
            let after = updated.to_attribute_map();
            if before == after {
                continue;
            }
            for route in self.routes_mut() {
                for stop in route.stops.iter_mut().filter(|s| s.id == updated.id) {
                    *stop = updated.clone();
                }
            }
            log.record(ChangeEvent::modify(
                ObjectType::Stop,
                updated.id.as_str(),
                before,
                after,
            ));
            changed.push(updated.id);
        }
        Ok(changed)
    }
}
