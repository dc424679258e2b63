use super::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// predicate over a single (possibly nested) attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AttributeCondition {
    /// value equals the given value. collection-valued attributes match when any member is equal.
    Equals { value: AttributeValue },
    /// value equals any of the acceptable values.
    OneOf { values: Vec<AttributeValue> },
    /// numeric value within inclusive bounds.
    Within { lower: f64, upper: f64 },
    /// descend one level into a nested attribute map.
    Nested {
        conditions: BTreeMap<String, AttributeCondition>,
    },
}

/// how the leaf conditions of a [`ConditionSet`] are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Any,
    #[default]
    All,
}

/// a collection of conditions keyed by attribute name, used to restrict bulk
/// attribute updates and to extract elements from the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub conditions: BTreeMap<String, AttributeCondition>,
    #[serde(default)]
    pub how: MatchMode,
}

impl ConditionSet {
    pub fn new(how: MatchMode) -> ConditionSet {
        ConditionSet {
            conditions: BTreeMap::new(),
            how,
        }
    }

    pub fn with(mut self, key: &str, condition: AttributeCondition) -> ConditionSet {
        self.conditions.insert(key.to_string(), condition);
        self
    }

    pub fn matches(&self, attributes: &AttributeMap) -> bool {
        match_all_keys(&self.conditions, attributes, self.how)
    }
}

impl AttributeCondition {
    pub fn equals<V: Into<AttributeValue>>(value: V) -> AttributeCondition {
        AttributeCondition::Equals {
            value: value.into(),
        }
    }

    pub fn one_of<V: Into<AttributeValue>>(values: Vec<V>) -> AttributeCondition {
        AttributeCondition::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn nested(key: &str, condition: AttributeCondition) -> AttributeCondition {
        AttributeCondition::Nested {
            conditions: BTreeMap::from([(key.to_string(), condition)]),
        }
    }

    /// tests this condition against a value, descending into nested maps. leaf
    /// results inside a nested map are combined according to `how`.
    pub fn matches(&self, value: Option<&AttributeValue>, how: MatchMode) -> bool {
        let value = match value {
            Some(v) => v,
            None => return false,
        };
        match self {
            AttributeCondition::Equals { value: expected } => value_equals(value, expected),
            AttributeCondition::OneOf { values } => {
                values.iter().any(|expected| value_equals(value, expected))
            }
            AttributeCondition::Within { lower, upper } => match value.members() {
                Some(members) => members
                    .iter()
                    .filter_map(|m| m.as_f64())
                    .any(|f| *lower <= f && f <= *upper),
                None => value
                    .as_f64()
                    .map(|f| *lower <= f && f <= *upper)
                    .unwrap_or(false),
            },
            AttributeCondition::Nested { conditions } => match value {
                AttributeValue::Map(inner) => match_all_keys(conditions, inner, how),
                _ => false,
            },
        }
    }
}

fn match_all_keys(
    conditions: &BTreeMap<String, AttributeCondition>,
    attributes: &AttributeMap,
    how: MatchMode,
) -> bool {
    if conditions.is_empty() {
        return true;
    }
    let mut results = conditions
        .iter()
        .map(|(key, condition)| condition.matches(attributes.get(key), how));
    match how {
        MatchMode::Any => results.any(|r| r),
        MatchMode::All => results.all(|r| r),
    }
}

/// equality with numeric coercion between Int and Float, and membership for
/// collection-valued attributes compared against a scalar.
fn value_equals(value: &AttributeValue, expected: &AttributeValue) -> bool {
    if let (Some(a), Some(b)) = (value.as_f64(), expected.as_f64()) {
        return a == b;
    }
    match (value.members(), expected.members()) {
        (Some(members), None) => members.iter().any(|m| value_equals(m, expected)),
        (Some(a), Some(b)) => a.len() == b.len() && a.iter().all(|m| b.contains(m)),
        _ => value == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeCondition as C, ConditionSet, MatchMode};
    use crate::model::attribute::{AttributeMap, AttributeValue as V};

    fn link_attributes() -> AttributeMap {
        let tags = AttributeMap::from([
            (String::from("osm:way:highway"), V::from("primary")),
            (String::from("osm:way:lanes"), V::from("2")),
        ]);
        AttributeMap::from([
            (String::from("freespeed"), V::Float(13.9)),
            (
                String::from("modes"),
                V::Set(vec![V::from("car"), V::from("bus")]),
            ),
            (String::from("attributes"), V::Map(tags)),
        ])
    }

    #[test]
    fn test_nested_equality() {
        let conditions = ConditionSet::new(MatchMode::All).with(
            "attributes",
            C::nested("osm:way:highway", C::equals("primary")),
        );
        assert!(conditions.matches(&link_attributes()));

        let conditions = ConditionSet::new(MatchMode::All).with(
            "attributes",
            C::nested("osm:way:highway", C::equals("secondary")),
        );
        assert!(!conditions.matches(&link_attributes()));
    }

    #[test]
    fn test_one_of_and_set_membership() {
        let conditions =
            ConditionSet::new(MatchMode::All).with("modes", C::one_of(vec!["rail", "bus"]));
        assert!(conditions.matches(&link_attributes()));
        let conditions = ConditionSet::new(MatchMode::All).with("modes", C::equals("walk"));
        assert!(!conditions.matches(&link_attributes()));
    }

    #[test]
    fn test_any_vs_all() {
        let any = ConditionSet::new(MatchMode::Any)
            .with("freespeed", C::Within { lower: 10.0, upper: 20.0 })
            .with("missing", C::equals(1_i64));
        assert!(any.matches(&link_attributes()));
        let all = ConditionSet {
            how: MatchMode::All,
            ..any
        };
        assert!(!all.matches(&link_attributes()));
    }

    #[test]
    fn test_numeric_coercion() {
        let attrs = AttributeMap::from([(String::from("capacity"), V::Int(600))]);
        let conditions = ConditionSet::new(MatchMode::All).with("capacity", C::equals(600.0));
        assert!(conditions.matches(&attrs));
    }
}
