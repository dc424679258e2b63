use super::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOp {
    Add,
    Change,
    Remove,
}

impl Display for DiffOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffOp::Add => write!(f, "add"),
            DiffOp::Change => write!(f, "change"),
            DiffOp::Remove => write!(f, "remove"),
        }
    }
}

/// one entry of a structural diff between two attribute maps. `path` is the
/// dot-delimited key path into nested maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDiff {
    pub op: DiffOp,
    pub path: String,
    pub old: Option<AttributeValue>,
    pub new: Option<AttributeValue>,
}

impl Display for AttributeDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let old = self.old.as_ref().map(|v| v.to_string()).unwrap_or_default();
        let new = self.new.as_ref().map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{} {}: '{}' -> '{}'", self.op, self.path, old, new)
    }
}

/// computes the structural diff between two attribute maps, recursing into
/// nested maps present on both sides. entries are ordered by key path.
pub fn diff_attributes(old: &AttributeMap, new: &AttributeMap) -> Vec<AttributeDiff> {
    let mut out = vec![];
    diff_recursive(old, new, None, &mut out);
    out
}

fn diff_recursive(
    old: &AttributeMap,
    new: &AttributeMap,
    prefix: Option<&str>,
    out: &mut Vec<AttributeDiff>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for key in keys.into_iter() {
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match (old.get(key), new.get(key)) {
            (None, Some(n)) => out.push(AttributeDiff {
                op: DiffOp::Add,
                path,
                old: None,
                new: Some(n.clone()),
            }),
            (Some(o), None) => out.push(AttributeDiff {
                op: DiffOp::Remove,
                path,
                old: Some(o.clone()),
                new: None,
            }),
            (Some(AttributeValue::Map(o)), Some(AttributeValue::Map(n))) => {
                diff_recursive(o, n, Some(&path), out)
            }
            (Some(o), Some(n)) if o != n => out.push(AttributeDiff {
                op: DiffOp::Change,
                path,
                old: Some(o.clone()),
                new: Some(n.clone()),
            }),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{diff_attributes, DiffOp};
    use crate::model::attribute::{AttributeMap, AttributeValue as V};

    #[test]
    fn test_nested_diff() {
        let old = AttributeMap::from([
            (String::from("freespeed"), V::Float(10.0)),
            (String::from("capacity"), V::Float(600.0)),
            (
                String::from("attributes"),
                V::Map(AttributeMap::from([(
                    String::from("osm:way:highway"),
                    V::from("primary"),
                )])),
            ),
        ]);
        let new = AttributeMap::from([
            (String::from("freespeed"), V::Float(20.0)),
            (String::from("length"), V::Float(5.0)),
            (
                String::from("attributes"),
                V::Map(AttributeMap::from([(
                    String::from("osm:way:highway"),
                    V::from("secondary"),
                )])),
            ),
        ]);
        let diff = diff_attributes(&old, &new);
        let summary = diff
            .iter()
            .map(|d| (d.op, d.path.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (DiffOp::Change, "attributes.osm:way:highway"),
                (DiffOp::Remove, "capacity"),
                (DiffOp::Change, "freespeed"),
                (DiffOp::Add, "length"),
            ]
        );
    }

    #[test]
    fn test_identical_maps_have_empty_diff() {
        let map = AttributeMap::from([(String::from("a"), V::Int(1))]);
        assert!(diff_attributes(&map, &map).is_empty());
    }
}
