use crate::model::schedule::{
    HeadwayStats, RouteStage, Schedule, ScheduleStage, Service, ServiceStage, VehicleDiagnostics,
};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub schedule_level: ScheduleLevelReport,
    /// by service id. a repeated id holds one report per service, in schedule order
    pub service_level: IndexMap<String, Vec<ServiceLevelReport>>,
    /// by service id, then route id, one report per route in schedule order
    pub route_level: IndexMap<String, IndexMap<String, Vec<RouteLevelReport>>>,
    pub vehicle_level: VehicleDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleLevelReport {
    pub is_valid_schedule: bool,
    pub invalid_stages: Vec<ScheduleStage>,
    pub invalid_services: Vec<String>,
    pub duplicate_service_ids: Vec<String>,
    /// (service id, route id) pairs repeated within a service
    pub duplicate_route_ids: Vec<(String, String)>,
    /// not part of schedule validity
    pub is_strongly_connected: bool,
    pub has_zero_headways: bool,
    pub routes_with_zero_headways: Vec<(String, String)>,
    pub has_zero_speeds: bool,
    pub routes_with_zero_speeds: Vec<(String, String)>,
    pub has_infinite_speeds: bool,
    pub routes_with_infinite_speeds: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelReport {
    pub is_valid_service: bool,
    pub invalid_stages: Vec<ServiceStage>,
    pub invalid_routes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLevelReport {
    pub is_valid_route: bool,
    pub invalid_stages: Vec<RouteStage>,
    /// minutes between departures, absent with fewer than two trips
    pub headway_stats: Option<HeadwayStats>,
}

impl ScheduleReport {
    pub fn from_schedule(schedule: &Schedule) -> ScheduleReport {
        let validity = schedule.is_valid_schedule();
        let routes_with_zero_headways = schedule.routes_with_zero_headways();
        let routes_with_zero_speeds = schedule.routes_with_zero_speeds();
        let routes_with_infinite_speeds = schedule.routes_with_infinite_speeds();
        let schedule_level = ScheduleLevelReport {
            is_valid_schedule: validity.is_valid,
            invalid_stages: validity.invalid_stages,
            invalid_services: schedule.invalid_services(),
            duplicate_service_ids: schedule
                .services
                .iter()
                .map(|s| s.id.clone())
                .duplicates()
                .collect(),
            duplicate_route_ids: schedule
                .services
                .iter()
                .flat_map(|s| {
                    s.routes
                        .iter()
                        .map(|r| r.id.as_str())
                        .duplicates()
                        .map(move |r| (s.id.clone(), r.to_string()))
                })
                .unique()
                .collect(),
            is_strongly_connected: schedule.is_strongly_connected(),
            has_zero_headways: !routes_with_zero_headways.is_empty(),
            routes_with_zero_headways,
            has_zero_speeds: !routes_with_zero_speeds.is_empty(),
            routes_with_zero_speeds,
            has_infinite_speeds: !routes_with_infinite_speeds.is_empty(),
            routes_with_infinite_speeds,
        };

        let mut service_level: IndexMap<String, Vec<ServiceLevelReport>> = IndexMap::new();
        let mut route_level: IndexMap<String, IndexMap<String, Vec<RouteLevelReport>>> =
            IndexMap::new();
        for service in schedule.services.iter() {
            service_level
                .entry(service.id.clone())
                .or_default()
                .push(ServiceLevelReport::from_service(service));
            let routes = route_level.entry(service.id.clone()).or_default();
            for route in service.routes.iter() {
                let validity = route.is_valid_route();
                routes.entry(route.id.clone()).or_default().push(RouteLevelReport {
                    is_valid_route: validity.is_valid,
                    invalid_stages: validity.invalid_stages,
                    headway_stats: route.headway_stats(),
                });
            }
        }

        ScheduleReport {
            schedule_level,
            service_level,
            route_level,
            vehicle_level: schedule.vehicle_diagnostics(),
        }
    }
}

impl ServiceLevelReport {
    fn from_service(service: &Service) -> ServiceLevelReport {
        let validity = service.is_valid_service();
        ServiceLevelReport {
            is_valid_service: validity.is_valid,
            invalid_stages: validity.invalid_stages,
            invalid_routes: service.invalid_routes(),
        }
    }
}
