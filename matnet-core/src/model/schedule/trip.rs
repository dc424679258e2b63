use super::TimeOffset;
use serde::{Deserialize, Serialize};

/// one scheduled run of a route, departing its first stop at `departure_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub departure_time: TimeOffset,
    pub vehicle_id: String,
}

impl Trip {
    pub fn new(trip_id: &str, departure_time: TimeOffset, vehicle_id: &str) -> Trip {
        Trip {
            trip_id: trip_id.to_string(),
            departure_time,
            vehicle_id: vehicle_id.to_string(),
        }
    }
}
