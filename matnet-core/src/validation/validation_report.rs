use super::{GraphReport, RoutingReport, ScheduleReport, ValidationConfig, ValidationError};
use crate::model::network::Network;
use serde::{Deserialize, Serialize};

/// structured findings of a validation run. format problems are reported here
/// and never raised as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// the schedule is valid and every route has a valid network route. graph
    /// connectivity does not take part.
    pub is_valid_network: bool,
    pub graph: GraphReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingReport>,
}

/// inspects the current state of the network and its schedule.
///
/// # Errors
///
/// only when the graph holds no nodes.
pub fn validate(network: &Network, config: &ValidationConfig) -> Result<ValidationReport, ValidationError> {
    if network.graph().is_empty() {
        return Err(ValidationError::EmptyGraph);
    }
    log::info!(
        "validating network with {} nodes, {} links",
        network.graph().n_nodes(),
        network.graph().n_links()
    );
    let graph = GraphReport::from_graph(network.graph(), config);
    let schedule = network.schedule().map(ScheduleReport::from_schedule);
    let routing = RoutingReport::from_network(network);

    let schedule_valid = schedule
        .as_ref()
        .map_or(true, |s| s.schedule_level.is_valid_schedule);
    let routes_valid = routing
        .as_ref()
        .map_or(true, |r| r.services_have_routes_in_the_graph);
    let is_valid_network = schedule_valid && routes_valid;
    if !is_valid_network {
        log::warn!(
            "network is not valid: schedule valid = {schedule_valid}, routes in graph = {routes_valid}"
        );
    }
    Ok(ValidationReport {
        is_valid_network,
        graph,
        schedule,
        routing,
    })
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::{
        model::{
            change_log::DiscardChanges,
            graph::{LinkData, NodeData, Projection, SpatialGraph},
            network::Network,
            schedule::{Route, Schedule, Service, Stop, TimeOffset, Trip},
        },
        validation::{CrowFlyRatio, ValidationConfig, ValidationError},
    };

    fn planar() -> Projection {
        Projection::Planar(String::from("epsg:27700"))
    }

    fn graph() -> SpatialGraph {
        let mut graph = SpatialGraph::new(planar());
        for (id, x) in [("A", 0.0), ("B", 100.0), ("C", 200.0)] {
            graph.add_node(NodeData::new(id, x, 0.0), &mut DiscardChanges);
        }
        graph
            .add_links(
                vec![
                    LinkData::new("ab", "A", "B", &["bus"]).with_length(150.0),
                    LinkData::new("bc", "B", "C", &["bus"]).with_length(150.0),
                    LinkData::new("ca", "C", "A", &["bus"]).with_length(200.0),
                ],
                &mut DiscardChanges,
            )
            .unwrap();
        graph
    }

    fn route(id: &str, mode: &str, stops: Vec<Stop>, links: &[&str]) -> Route {
        let n = stops.len() as u32;
        let offsets = (0..n).map(|i| TimeOffset(i * 60)).collect::<Vec<_>>();
        Route::new(id, mode, stops)
            .with_network_route(links)
            .with_offsets(offsets.clone(), offsets)
    }

    #[test]
    fn test_mode_incompatible_route_flagged() {
        let rail = route(
            "rail_r",
            "rail",
            vec![
                Stop::new("s1", 0.0, 0.0).with_link_ref("ab"),
                Stop::new("s2", 200.0, 0.0).with_link_ref("bc"),
            ],
            &["ab", "bc"],
        );
        let bus = route(
            "bus_r",
            "bus",
            vec![
                Stop::new("s1", 0.0, 0.0).with_link_ref("ab"),
                Stop::new("s2", 200.0, 0.0).with_link_ref("bc"),
            ],
            &["ab", "bc"],
        );
        let schedule = Schedule::new(planar(), vec![Service::new("svc", vec![rail, bus])]);
        let network = Network::with_schedule(graph(), schedule);

        let report = validate(&network, &ValidationConfig::default()).unwrap();
        let routing = report.routing.unwrap();
        assert_eq!(
            routing.service_routes_with_invalid_network_route,
            vec![(String::from("svc"), String::from("rail_r"))]
        );
        assert!(!routing.services_have_routes_in_the_graph);
        assert!(!report.is_valid_network);
        assert!(report.schedule.unwrap().schedule_level.is_valid_schedule);

        let ratios = &routing.route_to_crow_fly_ratio["svc"];
        assert_eq!(ratios["rail_r"], vec![CrowFlyRatio::Ratio(0.0)]);
        assert_eq!(ratios["bus_r"], vec![CrowFlyRatio::Ratio(1.5)]);
    }

    #[test]
    fn test_coinciding_terminal_stops_give_sentinel() {
        let circular = route(
            "loop",
            "bus",
            vec![
                Stop::new("s1", 0.0, 0.0).with_link_ref("ab"),
                Stop::new("s2", 200.0, 0.0).with_link_ref("bc"),
                Stop::new("s3", 0.0, 0.0).with_link_ref("ca"),
            ],
            &["ab", "bc", "ca"],
        );
        let schedule = Schedule::new(planar(), vec![Service::new("svc", vec![circular])]);
        let network = Network::with_schedule(graph(), schedule);
        let report = validate(&network, &ValidationConfig::default()).unwrap();
        assert!(report.is_valid_network);
        let routing = report.routing.unwrap();
        assert_eq!(
            routing.route_to_crow_fly_ratio["svc"]["loop"],
            vec![CrowFlyRatio::DivisionByZero]
        );
    }

    fn a_to_c(id: &str) -> Route {
        route(
            id,
            "bus",
            vec![
                Stop::new("s1", 0.0, 0.0).with_link_ref("ab"),
                Stop::new("s3", 200.0, 0.0).with_link_ref("bc"),
            ],
            &["ab", "bc"],
        )
    }

    #[test]
    fn test_one_way_schedule_is_valid_but_not_strongly_connected() {
        let schedule = Schedule::new(planar(), vec![Service::new("svc", vec![a_to_c("r")])]);
        let network = Network::with_schedule(graph(), schedule);
        let report = validate(&network, &ValidationConfig::default()).unwrap();
        assert!(report.is_valid_network);
        let schedule = report.schedule.unwrap();
        assert!(schedule.schedule_level.is_valid_schedule);
        assert!(!schedule.schedule_level.is_strongly_connected);
    }

    #[test]
    fn test_zero_headway_flagged_without_invalidating() {
        let departure = TimeOffset::from_hms(7, 30, 0);
        let bunched = a_to_c("bunched").with_trips(vec![
            Trip::new("t1", departure, "v1"),
            Trip::new("t2", departure, "v2"),
        ]);
        let schedule = Schedule::new(planar(), vec![Service::new("svc", vec![bunched])]);
        let network = Network::with_schedule(graph(), schedule);
        let report = validate(&network, &ValidationConfig::default()).unwrap();
        assert!(report.is_valid_network);
        let level = report.schedule.unwrap().schedule_level;
        assert!(level.has_zero_headways);
        assert_eq!(
            level.routes_with_zero_headways,
            vec![(String::from("svc"), String::from("bunched"))]
        );
    }

    #[test]
    fn test_repeated_route_ids_report_every_ratio() {
        let mut detour = a_to_c("r");
        detour.network_route = vec![];
        let schedule = Schedule::new(planar(), vec![Service::new("svc", vec![a_to_c("r"), detour])]);
        let network = Network::with_schedule(graph(), schedule);
        let report = validate(&network, &ValidationConfig::default()).unwrap();
        assert!(!report.is_valid_network);
        let routing = report.routing.unwrap();
        assert_eq!(
            routing.route_to_crow_fly_ratio["svc"]["r"],
            vec![CrowFlyRatio::Ratio(1.5), CrowFlyRatio::Ratio(0.0)]
        );
        let schedule = report.schedule.unwrap();
        assert_eq!(schedule.route_level["svc"]["r"].len(), 2);
        assert_eq!(
            schedule.schedule_level.duplicate_route_ids,
            vec![(String::from("svc"), String::from("r"))]
        );
    }

    #[test]
    fn test_network_without_schedule() {
        let report = validate(&Network::new(graph()), &ValidationConfig::default()).unwrap();
        assert!(report.is_valid_network);
        assert!(report.schedule.is_none());
        assert_eq!(report.graph.graph_connectivity["car"].number_of_connected_subgraphs, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("routing").is_none());
    }

    #[test]
    fn test_empty_graph_is_an_error() {
        let result = validate(&Network::new(SpatialGraph::new(planar())), &ValidationConfig::default());
        assert_eq!(result, Err(ValidationError::EmptyGraph));
    }
}
