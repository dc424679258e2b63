use super::{Schedule, TimeOffset};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// a trip as it appears within the schedule hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripRef {
    pub service_id: String,
    pub route_id: String,
    pub trip_id: String,
}

/// consistency of trip vehicles against the vehicle registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleDiagnostics {
    /// vehicle ids used by trips but not registered
    pub missing_vehicles: Vec<String>,
    /// vehicle types referenced by registered vehicles but not defined
    pub missing_vehicle_types: Vec<String>,
    /// registered vehicles no trip uses
    pub unused_vehicles: Vec<String>,
    /// vehicles serving trips of different routes at overlapping times
    pub multiple_use_vehicles: BTreeMap<String, Vec<TripRef>>,
}

impl VehicleDiagnostics {
    pub fn is_valid(&self) -> bool {
        self.missing_vehicles.is_empty()
            && self.missing_vehicle_types.is_empty()
            && self.unused_vehicles.is_empty()
            && self.multiple_use_vehicles.is_empty()
    }

    pub fn from_schedule(schedule: &Schedule) -> VehicleDiagnostics {
        let mut usage: BTreeMap<&str, Vec<(TripRef, TimeOffset, TimeOffset)>> = BTreeMap::new();
        for (service, route) in schedule.routes() {
            for (trip, start, end) in route.trip_intervals() {
                let trip_ref = TripRef {
                    service_id: service.id.clone(),
                    route_id: route.id.clone(),
                    trip_id: trip.trip_id.clone(),
                };
                usage
                    .entry(trip.vehicle_id.as_str())
                    .or_default()
                    .push((trip_ref, start, end));
            }
        }

        let missing_vehicles = usage
            .keys()
            .filter(|v| !schedule.vehicles.contains_key(**v))
            .map(|v| v.to_string())
            .collect();
        let missing_vehicle_types = schedule
            .vehicles
            .values()
            .map(|v| v.vehicle_type.as_str())
            .filter(|t| !schedule.vehicle_types.contains_key(*t))
            .unique()
            .sorted()
            .map(String::from)
            .collect();
        let unused_vehicles = schedule
            .vehicles
            .keys()
            .filter(|v| !usage.contains_key(v.as_str()))
            .cloned()
            .collect();

        let mut multiple_use_vehicles = BTreeMap::new();
        for (vehicle_id, trips) in usage.iter() {
            let conflicting = conflicting_trips(trips);
            if !conflicting.is_empty() {
                multiple_use_vehicles.insert(vehicle_id.to_string(), conflicting);
            }
        }

        VehicleDiagnostics {
            missing_vehicles,
            missing_vehicle_types,
            unused_vehicles,
            multiple_use_vehicles,
        }
    }
}

/// trips of different routes whose time windows overlap.
fn conflicting_trips(trips: &[(TripRef, TimeOffset, TimeOffset)]) -> Vec<TripRef> {
    let mut conflicting: BTreeSet<&TripRef> = BTreeSet::new();
    let sorted = trips.iter().sorted_by_key(|(_, start, _)| *start).collect_vec();
    for (i, (a, a_start, a_end)) in sorted.iter().enumerate() {
        for (b, b_start, _) in sorted.iter().skip(i + 1) {
            if b_start > a_end || (b_start == a_end && a_start != b_start) {
                break;
            }
            let same_route = a.service_id == b.service_id && a.route_id == b.route_id;
            if !same_route {
                conflicting.insert(a);
                conflicting.insert(b);
            }
        }
    }
    conflicting.into_iter().cloned().collect()
}
