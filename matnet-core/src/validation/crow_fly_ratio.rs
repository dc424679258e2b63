use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

/// ratio of the length travelled along a route's network links to the straight
/// line distance between its first and last stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrowFlyRatio {
    Ratio(f64),
    /// first and last stop coincide
    DivisionByZero,
}

impl CrowFlyRatio {
    const DIVISION_BY_ZERO: &'static str = "Division by zero";

    pub fn from_lengths(route_length: f64, crow_fly_distance: f64) -> CrowFlyRatio {
        if crow_fly_distance == 0.0 {
            CrowFlyRatio::DivisionByZero
        } else {
            CrowFlyRatio::Ratio(route_length / crow_fly_distance)
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            CrowFlyRatio::Ratio(r) => Some(*r),
            CrowFlyRatio::DivisionByZero => None,
        }
    }
}

impl Display for CrowFlyRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrowFlyRatio::Ratio(r) => write!(f, "{r}"),
            CrowFlyRatio::DivisionByZero => write!(f, "{}", Self::DIVISION_BY_ZERO),
        }
    }
}

impl Serialize for CrowFlyRatio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CrowFlyRatio::Ratio(r) => serializer.serialize_f64(*r),
            CrowFlyRatio::DivisionByZero => serializer.serialize_str(Self::DIVISION_BY_ZERO),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRatio {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for CrowFlyRatio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawRatio::deserialize(deserializer)? {
            RawRatio::Number(r) => Ok(CrowFlyRatio::Ratio(r)),
            RawRatio::Text(t) if t == Self::DIVISION_BY_ZERO => Ok(CrowFlyRatio::DivisionByZero),
            RawRatio::Text(t) => Err(serde::de::Error::custom(format!(
                "expected a number or '{}', found '{t}'",
                Self::DIVISION_BY_ZERO
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CrowFlyRatio;

    #[test]
    fn test_sentinel_serialized_as_text() {
        let json = serde_json::to_string(&CrowFlyRatio::DivisionByZero).unwrap();
        assert_eq!(json, "\"Division by zero\"");
        let back: CrowFlyRatio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CrowFlyRatio::DivisionByZero);
        let ratio: CrowFlyRatio = serde_json::from_str("1.5").unwrap();
        assert_eq!(ratio.ratio(), Some(1.5));
        assert!(serde_json::from_str::<CrowFlyRatio>("\"nope\"").is_err());
    }
}
