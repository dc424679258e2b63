use super::AttributeError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

/// nested attribute bag attached to nodes, links and stops. keys are tag names,
/// values may be scalars, collections or further nested maps.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// a single value in an [`AttributeMap`].
///
/// `Set` only arises in memory, for example when simplification fuses links with
/// differing tag values. it serializes as a JSON array and deserializes back as a
/// `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttributeValue>),
    Set(Vec<AttributeValue>),
    Map(AttributeMap),
}

impl AttributeValue {
    pub const ARRAY_DELIMITER: &'static str = ",";

    /// decodes a MATSim typed attribute, `<attribute name=".." class="..">text</attribute>`.
    /// the class may be fully qualified (`java.lang.Double`) or the simple name.
    pub fn from_typed(class: &str, text: &str) -> Result<AttributeValue, AttributeError> {
        let simple = class.rsplit('.').next().unwrap_or(class);
        let invalid = || AttributeError::InvalidTypedValue {
            class: class.to_string(),
            text: text.to_string(),
        };
        match simple {
            "String" => Ok(AttributeValue::Text(text.to_string())),
            "Long" | "Double" | "Float" => text
                .trim()
                .parse::<f64>()
                .map(AttributeValue::Float)
                .map_err(|_| invalid()),
            "Integer" | "Short" => text
                .trim()
                .parse::<i64>()
                .map(AttributeValue::Int)
                .map_err(|_| invalid()),
            "Boolean" => match text.trim().to_lowercase().as_str() {
                "true" => Ok(AttributeValue::Bool(true)),
                "false" => Ok(AttributeValue::Bool(false)),
                _ => Err(invalid()),
            },
            "Array" => {
                let values = text
                    .split(Self::ARRAY_DELIMITER)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| AttributeValue::Text(s.to_string()))
                    .collect_vec();
                Ok(AttributeValue::List(values))
            }
            _ => Err(AttributeError::UnknownClass(class.to_string())),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// members of a List or Set, or None for any other variant.
    pub fn members(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(vs) | AttributeValue::Set(vs) => Some(vs.as_slice()),
            _ => None,
        }
    }

    /// combines values found on several elements into one. identical values stay
    /// scalar, otherwise the distinct values (with existing sets flattened) form a Set.
    /// maps are merged key by key.
    pub fn merge_distinct(values: Vec<AttributeValue>) -> Option<AttributeValue> {
        if values.is_empty() {
            return None;
        }
        if values.iter().all(|v| matches!(v, AttributeValue::Map(_))) {
            let mut keyed: BTreeMap<String, Vec<AttributeValue>> = BTreeMap::new();
            for value in values.into_iter() {
                if let AttributeValue::Map(m) = value {
                    for (k, v) in m.into_iter() {
                        keyed.entry(k).or_default().push(v);
                    }
                }
            }
            let merged = keyed
                .into_iter()
                .filter_map(|(k, vs)| Self::merge_distinct(vs).map(|v| (k, v)))
                .collect::<AttributeMap>();
            return Some(AttributeValue::Map(merged));
        }

        let mut distinct: Vec<AttributeValue> = vec![];
        for value in values.into_iter() {
            let flattened = match value {
                AttributeValue::Set(members) => members,
                other => vec![other],
            };
            for member in flattened.into_iter() {
                if !distinct.contains(&member) {
                    distinct.push(member);
                }
            }
        }
        match distinct.len() {
            1 => distinct.pop(),
            _ => Some(AttributeValue::Set(distinct)),
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Text(s) => write!(f, "{s}"),
            AttributeValue::List(vs) => write!(f, "{}", vs.iter().join(Self::ARRAY_DELIMITER)),
            AttributeValue::Set(vs) => write!(f, "{{{}}}", vs.iter().join(Self::ARRAY_DELIMITER)),
            AttributeValue::Map(m) => {
                let entries = m.iter().map(|(k, v)| format!("{k}: {v}")).join(", ");
                write!(f, "{{{entries}}}")
            }
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(value: AttributeMap) -> Self {
        AttributeValue::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeMap, AttributeValue as V};

    #[test]
    fn test_typed_decoding() {
        assert_eq!(V::from_typed("java.lang.Long", "12").unwrap(), V::Float(12.0));
        assert_eq!(V::from_typed("java.lang.Short", "3").unwrap(), V::Int(3));
        assert_eq!(V::from_typed("Boolean", "TRUE").unwrap(), V::Bool(true));
        assert_eq!(
            V::from_typed("java.lang.Array", "a, b,c").unwrap(),
            V::List(vec![V::from("a"), V::from("b"), V::from("c")])
        );
        assert!(V::from_typed("java.lang.Integer", "1.5").is_err());
        assert!(V::from_typed("java.lang.Object", "x").is_err());
    }

    #[test]
    fn test_merge_distinct_scalars() {
        let same = V::merge_distinct(vec![V::from("primary"), V::from("primary")]);
        assert_eq!(same, Some(V::from("primary")));

        let mixed = V::merge_distinct(vec![V::Int(1), V::Int(2), V::Set(vec![V::Int(2), V::Int(3)])]);
        assert_eq!(mixed, Some(V::Set(vec![V::Int(1), V::Int(2), V::Int(3)])));
    }

    #[test]
    fn test_merge_distinct_nested() {
        let a = AttributeMap::from([
            (String::from("osm:way:id"), V::from("100")),
            (String::from("osm:way:highway"), V::from("primary")),
        ]);
        let b = AttributeMap::from([
            (String::from("osm:way:id"), V::from("200")),
            (String::from("osm:way:highway"), V::from("primary")),
        ]);
        let merged = V::merge_distinct(vec![V::Map(a), V::Map(b)]).unwrap();
        let map = merged.as_map().unwrap();
        assert_eq!(map["osm:way:highway"], V::from("primary"));
        assert_eq!(
            map["osm:way:id"],
            V::Set(vec![V::from("100"), V::from("200")])
        );
    }
}
