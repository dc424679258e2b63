use super::{LinkId, NodeId};
use crate::model::attribute::{
    expect_f64, merge_into, type_mismatch, AttributeError, AttributeMap, AttributeValue,
};
use geo::LineString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// a directed link between two nodes of the network graph. parallel links
/// between the same pair of nodes are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub modes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freespeed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permlanes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneway: Option<bool>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<LineString<f64>>,
}

impl LinkData {
    /// numeric fields inspected by the link attribute validation scan.
    pub const NUMERIC_FIELDS: [&'static str; 4] = ["length", "capacity", "freespeed", "permlanes"];

    pub fn new(id: &str, from: &str, to: &str, modes: &[&str]) -> LinkData {
        LinkData {
            id: LinkId::from(id),
            from: NodeId::from(from),
            to: NodeId::from(to),
            modes: modes.iter().map(|m| m.to_string()).collect(),
            freespeed: None,
            capacity: None,
            permlanes: None,
            length: None,
            oneway: None,
            attributes: AttributeMap::new(),
            geometry: None,
        }
    }

    pub fn with_length(mut self, length: f64) -> LinkData {
        self.length = Some(length);
        self
    }

    pub fn with_freespeed(mut self, freespeed: f64) -> LinkData {
        self.freespeed = Some(freespeed);
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> LinkData {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_permlanes(mut self, permlanes: f64) -> LinkData {
        self.permlanes = Some(permlanes);
        self
    }

    pub fn permits(&self, mode: &str) -> bool {
        self.modes.contains(mode)
    }

    pub fn numeric_value(&self, field: &str) -> Option<f64> {
        match field {
            "length" => self.length,
            "capacity" => self.capacity,
            "freespeed" => self.freespeed,
            "permlanes" => self.permlanes,
            _ => None,
        }
    }

    /// traversal cost used by shortest path search: length / freespeed when
    /// a positive freespeed is known, otherwise the length itself.
    pub fn travel_time(&self) -> f64 {
        let length = self.length.unwrap_or(0.0);
        match self.freespeed {
            Some(speed) if speed > 0.0 && speed.is_finite() => length / speed,
            _ => length,
        }
    }

    pub fn to_attribute_map(&self) -> AttributeMap {
        let mut out = AttributeMap::new();
        out.insert(String::from("id"), AttributeValue::from(self.id.as_str()));
        out.insert(String::from("from"), AttributeValue::from(self.from.as_str()));
        out.insert(String::from("to"), AttributeValue::from(self.to.as_str()));
        out.insert(
            String::from("modes"),
            AttributeValue::Set(
                self.modes
                    .iter()
                    .map(|m| AttributeValue::from(m.as_str()))
                    .collect(),
            ),
        );
        for field in Self::NUMERIC_FIELDS {
            if let Some(v) = self.numeric_value(field) {
                out.insert(field.to_string(), AttributeValue::Float(v));
            }
        }
        if let Some(oneway) = self.oneway {
            out.insert(String::from("oneway"), AttributeValue::Bool(oneway));
        }
        if !self.attributes.is_empty() {
            out.insert(
                String::from("attributes"),
                AttributeValue::Map(self.attributes.clone()),
            );
        }
        out
    }

    pub fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.to_attribute_map().remove(key)
    }

    /// sets a field by name. the link id and its endpoints cannot be changed
    /// this way; unknown keys land in the nested attribute bag.
    pub fn set_attribute(&mut self, key: &str, value: AttributeValue) -> Result<(), AttributeError> {
        match key {
            "id" | "from" | "to" => Err(AttributeError::ImmutableField(key.to_string())),
            "length" => {
                self.length = Some(expect_f64(key, &value)?);
                Ok(())
            }
            "capacity" => {
                self.capacity = Some(expect_f64(key, &value)?);
                Ok(())
            }
            "freespeed" => {
                self.freespeed = Some(expect_f64(key, &value)?);
                Ok(())
            }
            "permlanes" => {
                self.permlanes = Some(expect_f64(key, &value)?);
                Ok(())
            }
            "oneway" => {
                let b = value
                    .as_bool()
                    .ok_or_else(|| type_mismatch(key, "a boolean", &value))?;
                self.oneway = Some(b);
                Ok(())
            }
            "modes" => {
                self.modes = modes_from_value(&value)?;
                Ok(())
            }
            "attributes" => match value {
                AttributeValue::Map(m) => {
                    merge_into(&mut self.attributes, m);
                    Ok(())
                }
                other => Err(type_mismatch(key, "a nested map", &other)),
            },
            _ => {
                self.attributes.insert(key.to_string(), value);
                Ok(())
            }
        }
    }
}

/// modes may be given as a collection of strings or a single comma-separated string.
fn modes_from_value(value: &AttributeValue) -> Result<BTreeSet<String>, AttributeError> {
    match value {
        AttributeValue::Text(s) => Ok(s
            .split(',')
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(String::from)
            .collect()),
        AttributeValue::List(vs) | AttributeValue::Set(vs) => vs
            .iter()
            .map(|v| {
                v.as_str()
                    .map(String::from)
                    .ok_or_else(|| type_mismatch("modes", "a string mode", v))
            })
            .collect(),
        other => Err(type_mismatch("modes", "a set of modes", other)),
    }
}
