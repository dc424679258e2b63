use super::CrowFlyRatio;
use crate::model::{network::Network, schedule::Route};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingReport {
    /// true when every route has a valid network route
    pub services_have_routes_in_the_graph: bool,
    /// (service id, route id) pairs
    pub service_routes_with_invalid_network_route: Vec<(String, String)>,
    /// by service id, then route id. repeated ids hold one ratio per route in
    /// schedule order
    pub route_to_crow_fly_ratio: IndexMap<String, IndexMap<String, Vec<CrowFlyRatio>>>,
}

impl RoutingReport {
    /// None when the network has no schedule.
    pub fn from_network(network: &Network) -> Option<RoutingReport> {
        let schedule = network.schedule()?;
        let invalid = network.invalid_network_routes();
        let mut route_to_crow_fly_ratio: IndexMap<String, IndexMap<String, Vec<CrowFlyRatio>>> =
            IndexMap::new();
        for (service, route) in schedule.routes() {
            let ratio = crow_fly_ratio(network, route);
            route_to_crow_fly_ratio
                .entry(service.id.clone())
                .or_default()
                .entry(route.id.clone())
                .or_default()
                .push(ratio);
        }
        Some(RoutingReport {
            services_have_routes_in_the_graph: invalid.is_empty(),
            service_routes_with_invalid_network_route: invalid,
            route_to_crow_fly_ratio,
        })
    }
}

/// 0 for routes without a valid network route.
fn crow_fly_ratio(network: &Network, route: &Route) -> CrowFlyRatio {
    if !network.route_network_route_is_valid(route) {
        return CrowFlyRatio::Ratio(0.0);
    }
    let (Some(first), Some(last), Ok(length)) =
        (route.first_stop(), route.last_stop(), network.route_length(route))
    else {
        return CrowFlyRatio::Ratio(0.0);
    };
    let distance = network
        .graph()
        .projection()
        .distance(first.point(), last.point());
    CrowFlyRatio::from_lengths(length, distance)
}
