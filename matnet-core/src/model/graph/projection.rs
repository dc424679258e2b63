use super::GraphError;
use geo::{Distance, Euclidean, Haversine, Point};
use h3o::{LatLng, Resolution};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// coordinate reference system of node x/y values. only the distinction between
/// geographic (lon/lat degrees) and projected (planar units) coordinates matters
/// for distance computations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Projection {
    #[default]
    Wgs84,
    Planar(String),
}

impl Projection {
    pub const WGS84_CODE: &'static str = "epsg:4326";

    pub fn is_geographic(&self) -> bool {
        matches!(self, Projection::Wgs84)
    }

    /// distance between two points in meters (haversine) for geographic
    /// coordinates, otherwise in the units of the planar projection.
    pub fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        match self {
            Projection::Wgs84 => Haversine.distance(a, b),
            Projection::Planar(_) => Euclidean.distance(a, b),
        }
    }
}

impl FromStr for Projection {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" => Err(GraphError::InvalidProjection(s.to_string())),
            Self::WGS84_CODE | "wgs84" => Ok(Projection::Wgs84),
            other if other.starts_with("epsg:") => Ok(Projection::Planar(other.to_string())),
            _ => Err(GraphError::InvalidProjection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Projection {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Projection::from_str(&value)
    }
}

impl From<Projection> for String {
    fn from(value: Projection) -> Self {
        value.to_string()
    }
}

impl Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Projection::Wgs84 => write!(f, "{}", Self::WGS84_CODE),
            Projection::Planar(code) => write!(f, "{code}"),
        }
    }
}

/// H3 cell token for a lon/lat pair, used to recognise the same physical node
/// across separately built networks. non-finite coordinates produce no token.
pub fn spatial_token(lon: f64, lat: f64, resolution: Resolution) -> Option<String> {
    LatLng::new(lat, lon)
        .ok()
        .map(|ll| ll.to_cell(resolution).to_string())
}
