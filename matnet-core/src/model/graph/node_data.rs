use super::NodeId;
use crate::model::attribute::{
    expect_f64, merge_into, type_mismatch, AttributeError, AttributeMap, AttributeValue,
};
use geo::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// spatial index cell used to match this node against nodes of another network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_token: Option<String>,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
}

impl NodeData {
    pub fn new(id: &str, x: f64, y: f64) -> NodeData {
        NodeData {
            id: NodeId::from(id),
            x,
            y,
            lon: None,
            lat: None,
            spatial_token: None,
            attributes: AttributeMap::new(),
        }
    }

    pub fn with_lon_lat(mut self, lon: f64, lat: f64) -> NodeData {
        self.lon = Some(lon);
        self.lat = Some(lat);
        self
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    /// flat view of every field, used for condition matching and change log snapshots.
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
        if let Some(token) = &self.spatial_token {
            out.insert(
                String::from("spatial_token"),
                AttributeValue::from(token.as_str()),
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

    pub fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.to_attribute_map().remove(key)
    }

    /// sets a field by name. unknown keys are written to the nested attribute bag;
    /// a map written to `attributes` is merged into the existing bag.
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
            "spatial_token" => match value {
                AttributeValue::Text(s) => {
                    self.spatial_token = Some(s);
                    Ok(())
                }
                other => Err(type_mismatch(key, "text", &other)),
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
