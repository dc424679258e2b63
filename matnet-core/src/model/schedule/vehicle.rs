use crate::model::attribute::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};

/// a registered vehicle instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "type")]
    pub vehicle_type: String,
}

impl Vehicle {
    /// vehicles are keyed in the registry, so the id is passed in.
    pub fn to_attribute_map(&self, id: &str) -> AttributeMap {
        AttributeMap::from([
            (String::from("id"), AttributeValue::from(id)),
            (String::from("type"), AttributeValue::from(self.vehicle_type.as_str())),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleCapacity {
    pub seats: u32,
    pub standing_room: u32,
}

/// operational and physical parameters shared by every vehicle of a type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleType {
    pub capacity: VehicleCapacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// seconds per boarding passenger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_time: Option<f64>,
    /// seconds per alighting passenger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_operation: Option<DoorOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_car_equivalents: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorOperation {
    Serial,
    Parallel,
}

/// a minimal transfer time between two stops, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalTransferTime {
    pub from_stop: super::StopId,
    pub to_stop: super::StopId,
    pub seconds: f64,
}
