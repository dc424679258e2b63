use super::{HeadwayStats, RouteStage, Stop, StopGraph, StopId, TimeOffset, Trip, Validity};
use crate::model::{
    attribute::{AttributeMap, AttributeValue},
    graph::{LinkId, Projection},
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// an ordered pattern of stops served by any number of trips, together with the
/// chain of network links a vehicle follows between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    #[serde(default)]
    pub route_short_name: String,
    pub mode: String,
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub network_route: Vec<LinkId>,
    /// one offset per stop, relative to the trip departure
    #[serde(default)]
    pub arrival_offsets: Vec<TimeOffset>,
    #[serde(default)]
    pub departure_offsets: Vec<TimeOffset>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
}

/// speed travelled between two consecutive stops of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSpeed {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub distance: f64,
    pub seconds: u32,
    /// distance units per second. infinite when a non-zero distance takes no time
    pub speed: f64,
}

impl Route {
    pub fn new(id: &str, mode: &str, stops: Vec<Stop>) -> Route {
        Route {
            id: id.to_string(),
            route_short_name: String::new(),
            mode: mode.to_string(),
            stops,
            network_route: vec![],
            arrival_offsets: vec![],
            departure_offsets: vec![],
            trips: vec![],
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_network_route(mut self, links: &[&str]) -> Route {
        self.network_route = links.iter().map(|l| LinkId::from(*l)).collect();
        self
    }

    pub fn with_offsets(mut self, arrival: Vec<TimeOffset>, departure: Vec<TimeOffset>) -> Route {
        self.arrival_offsets = arrival;
        self.departure_offsets = departure;
        self
    }

    pub fn with_trips(mut self, trips: Vec<Trip>) -> Route {
        self.trips = trips;
        self
    }

    pub fn stop_ids(&self) -> impl Iterator<Item = &StopId> {
        self.stops.iter().map(|s| &s.id)
    }

    pub fn first_stop(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn last_stop(&self) -> Option<&Stop> {
        self.stops.last()
    }

    pub fn n_trips(&self) -> usize {
        self.trips.len()
    }

    pub fn to_attribute_map(&self) -> AttributeMap {
        let mut out = AttributeMap::new();
        out.insert(String::from("id"), AttributeValue::from(self.id.as_str()));
        out.insert(
            String::from("route_short_name"),
            AttributeValue::from(self.route_short_name.as_str()),
        );
        out.insert(String::from("mode"), AttributeValue::from(self.mode.as_str()));
        out.insert(
            String::from("ordered_stops"),
            AttributeValue::List(self.stop_ids().map(|s| AttributeValue::from(s.as_str())).collect()),
        );
        out.insert(
            String::from("network_route"),
            AttributeValue::List(
                self.network_route
                    .iter()
                    .map(|l| AttributeValue::from(l.as_str()))
                    .collect(),
            ),
        );
        out.insert(
            String::from("trips"),
            AttributeValue::List(
                self.trips
                    .iter()
                    .map(|t| AttributeValue::from(t.trip_id.as_str()))
                    .collect(),
            ),
        );
        out
    }

    /// runs every route check and collects the names of those that fail.
    pub fn is_valid_route(&self) -> Validity<RouteStage> {
        let mut failures = vec![];
        if !self.has_more_than_one_stop() {
            failures.push(RouteStage::NotHasMoreThanOneStop);
        }
        if !self.has_correctly_ordered_route() {
            failures.push(RouteStage::NotHasCorrectlyOrderedRoute);
        }
        if !self.has_valid_offsets() {
            failures.push(RouteStage::NotHasValidOffsets);
        }
        if self.has_self_loops() {
            failures.push(RouteStage::HasSelfLoops);
        }
        Validity::from_failures(failures)
    }

    pub fn has_more_than_one_stop(&self) -> bool {
        self.stops.len() > 1
    }

    /// true when every stop references a link and those links appear in the
    /// network route in stop order. consecutive stops may share a link.
    pub fn has_correctly_ordered_route(&self) -> bool {
        if self.network_route.is_empty() {
            return false;
        }
        let mut cursor = 0;
        for stop in self.stops.iter() {
            let Some(link_ref) = &stop.link_ref_id else {
                return false;
            };
            match self.network_route[cursor..]
                .iter()
                .position(|l| l == link_ref)
            {
                Some(found) => cursor += found,
                None => return false,
            }
        }
        true
    }

    /// offsets are present, one of each per stop, non-decreasing along the
    /// route and no stop departs before it is reached.
    pub fn has_valid_offsets(&self) -> bool {
        let n = self.stops.len();
        if n == 0 || self.arrival_offsets.len() != n || self.departure_offsets.len() != n {
            return false;
        }
        let ordered = |offsets: &[TimeOffset]| offsets.iter().tuple_windows().all(|(a, b)| a <= b);
        ordered(&self.arrival_offsets)
            && ordered(&self.departure_offsets)
            && self
                .arrival_offsets
                .iter()
                .zip(self.departure_offsets.iter())
                .all(|(arrival, departure)| arrival <= departure)
            && self
                .departure_offsets
                .iter()
                .zip(self.arrival_offsets.iter().skip(1))
                .all(|(departure, next_arrival)| departure <= next_arrival)
    }

    /// true if any stop is immediately followed by itself.
    pub fn has_self_loops(&self) -> bool {
        self.stops
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.id == b.id)
    }

    pub fn graph(&self) -> StopGraph {
        let mut graph = StopGraph::default();
        graph.add_route(self, None);
        graph
    }

    /// minutes between consecutive trip departures, in departure order.
    pub fn headways(&self) -> Vec<f64> {
        self.trips
            .iter()
            .map(|t| t.departure_time)
            .sorted()
            .tuple_windows()
            .map(|(a, b)| (b.seconds() - a.seconds()) as f64 / 60.0)
            .collect()
    }

    pub fn headway_stats(&self) -> Option<HeadwayStats> {
        HeadwayStats::from_headways(&self.headways())
    }

    /// time window each trip occupies its vehicle, from departure at the first
    /// stop to arrival at the last.
    pub fn trip_intervals(&self) -> Vec<(&Trip, TimeOffset, TimeOffset)> {
        let duration = self.arrival_offsets.last().copied().unwrap_or_default();
        self.trips
            .iter()
            .map(|t| (t, t.departure_time, t.departure_time + duration))
            .collect()
    }

    /// straight line speed between consecutive stops, using the time from departing
    /// one stop to arriving at the next. empty when the offsets are unusable.
    pub fn speeds(&self, projection: &Projection) -> Vec<StopSpeed> {
        if !self.has_valid_offsets() {
            return vec![];
        }
        self.stops
            .iter()
            .zip(self.departure_offsets.iter())
            .zip(self.arrival_offsets.iter())
            .tuple_windows()
            .map(|(((from, departure), _), ((to, _), arrival))| {
                let distance = projection.distance(from.point(), to.point());
                let seconds = arrival.seconds().saturating_sub(departure.seconds());
                let speed = match (seconds, distance > 0.0) {
                    (0, true) => f64::INFINITY,
                    (0, false) => 0.0,
                    (s, _) => distance / s as f64,
                };
                StopSpeed {
                    from_stop: from.id.clone(),
                    to_stop: to.id.clone(),
                    distance,
                    seconds,
                    speed,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Route;
    use crate::model::{
        graph::Projection,
        schedule::{RouteStage, Stop, TimeOffset, Trip},
    };

    fn t(s: &str) -> TimeOffset {
        s.parse().unwrap()
    }

    fn valid_route() -> Route {
        Route::new(
            "r1",
            "bus",
            vec![
                Stop::new("A", 0.0, 0.0).with_link_ref("1"),
                Stop::new("B", 600.0, 0.0).with_link_ref("3"),
            ],
        )
        .with_network_route(&["1", "2", "3"])
        .with_offsets(
            vec![t("00:00:00"), t("00:02:00")],
            vec![t("00:00:00"), t("00:02:00")],
        )
        .with_trips(vec![
            Trip::new("t1", t("08:00:00"), "v1"),
            Trip::new("t2", t("08:10:00"), "v2"),
            Trip::new("t3", t("08:30:00"), "v1"),
        ])
    }

    #[test]
    fn test_valid_route() {
        let validity = valid_route().is_valid_route();
        assert!(validity.is_valid, "{:?}", validity.invalid_stages);
    }

    #[test]
    fn test_single_stop_route_is_invalid() {
        let mut route = valid_route();
        route.stops.truncate(1);
        let validity = route.is_valid_route();
        assert!(!validity.is_valid);
        assert!(validity
            .invalid_stages
            .contains(&RouteStage::NotHasMoreThanOneStop));
    }

    #[test]
    fn test_decreasing_offsets_are_invalid() {
        let route = valid_route().with_offsets(
            vec![t("00:02:00"), t("00:00:00")],
            vec![t("00:02:00"), t("00:00:00")],
        );
        let validity = route.is_valid_route();
        assert_eq!(validity.invalid_stages, vec![RouteStage::NotHasValidOffsets]);
    }

    #[test]
    fn test_reversed_network_route_is_invalid() {
        let route = valid_route().with_network_route(&["3", "2", "1"]);
        let validity = route.is_valid_route();
        assert_eq!(
            validity.invalid_stages,
            vec![RouteStage::NotHasCorrectlyOrderedRoute]
        );
    }

    #[test]
    fn test_missing_network_route_is_not_correctly_ordered() {
        let route = valid_route().with_network_route(&[]);
        assert!(!route.has_correctly_ordered_route());
    }

    #[test]
    fn test_immediate_repeat_is_invalid() {
        let route = Route::new(
            "r1",
            "bus",
            vec![
                Stop::new("A", 0.0, 0.0).with_link_ref("1"),
                Stop::new("A", 0.0, 0.0).with_link_ref("1"),
            ],
        )
        .with_network_route(&["1"])
        .with_offsets(
            vec![t("00:00:00"), t("00:01:00")],
            vec![t("00:00:00"), t("00:01:00")],
        );
        let validity = route.is_valid_route();
        assert!(!validity.is_valid);
        assert_eq!(validity.invalid_stages, vec![RouteStage::HasSelfLoops]);
    }

    #[test]
    fn test_headways() {
        let route = valid_route();
        assert_eq!(route.headways(), vec![10.0, 20.0]);
        let stats = route.headway_stats().unwrap();
        assert_eq!(stats.mean, 15.0);
        assert!(!stats.has_zero_headway());
    }

    #[test]
    fn test_speeds() {
        let planar = Projection::Planar(String::from("epsg:27700"));
        let speeds = valid_route().speeds(&planar);
        assert_eq!(speeds.len(), 1);
        assert_eq!(speeds[0].seconds, 120);
        assert_eq!(speeds[0].speed, 5.0);

        let instant = valid_route().with_offsets(
            vec![t("00:00:00"), t("00:00:00")],
            vec![t("00:00:00"), t("00:00:00")],
        );
        assert!(instant.speeds(&planar)[0].speed.is_infinite());
    }
}
