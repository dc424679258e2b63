use crate::model::{
    attribute::{expect_f64, merge_into, type_mismatch, AttributeError, AttributeMap, AttributeValue},
    graph::LinkId,
};
use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(
    Debug, Default, Clone, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
#[serde(transparent)]
pub struct StopId(pub String);

impl StopId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StopId {
    fn from(value: &str) -> Self {
        StopId(value.to_string())
    }
}

/// a public transport stop. the same stop may appear in many routes, each
/// holding its own copy under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// link anchoring this stop to the network graph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_ref_id: Option<LinkId>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
}

impl Stop {
    pub fn new(id: &str, x: f64, y: f64) -> Stop {
        Stop {
            id: StopId::from(id),
            x,
            y,
            lon: None,
            lat: None,
            name: None,
            link_ref_id: None,
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_link_ref(mut self, link_id: &str) -> Stop {
        self.link_ref_id = Some(LinkId::from(link_id));
        self
    }

    pub fn with_name(mut self, name: &str) -> Stop {
        self.name = Some(name.to_string());
        self
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    pub fn to_attribute_map(&self) -> AttributeMap {
        let mut out = AttributeMap::new();
        out.insert(String::from("id"), AttributeValue::from(self.id.as_str()));
        out.insert(String::from("x"), AttributeValue::Float(self.x));
        out.insert(String::from("y"), AttributeValue::Float(self.y));
        if let Some(lon) = self.lon {
            out.insert(String::from("lon"), AttributeValue::Float(lon));
        }
        if let Some(lat) = self.lat {
            out.insert(String::from("lat"), AttributeValue::Float(lat));
        }
        if let Some(name) = &self.name {
            out.insert(String::from("name"), AttributeValue::from(name.as_str()));
        }
        if let Some(link) = &self.link_ref_id {
            out.insert(
                String::from("link_ref_id"),
                AttributeValue::from(link.as_str()),
            );
        }
        if !self.attributes.is_empty() {
            out.insert(
                String::from("attributes"),
                AttributeValue::Map(self.attributes.clone()),
            );
        }
        out
    }

    pub fn set_attribute(&mut self, key: &str, value: AttributeValue) -> Result<(), AttributeError> {
        match key {
            "id" => Err(AttributeError::ImmutableField(key.to_string())),
            "x" => {
                self.x = expect_f64(key, &value)?;
                Ok(())
            }
            "y" => {
                self.y = expect_f64(key, &value)?;
                Ok(())
            }
            "lon" => {
                self.lon = Some(expect_f64(key, &value)?);
                Ok(())
            }
            "lat" => {
                self.lat = Some(expect_f64(key, &value)?);
                Ok(())
            }
            "name" => match value {
                AttributeValue::Text(s) => {
                    self.name = Some(s);
                    Ok(())
                }
                other => Err(type_mismatch(key, "text", &other)),
            },
            "link_ref_id" => match value {
                AttributeValue::Text(s) => {
                    self.link_ref_id = Some(LinkId(s));
                    Ok(())
                }
                other => Err(type_mismatch(key, "a link id", &other)),
            },
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
