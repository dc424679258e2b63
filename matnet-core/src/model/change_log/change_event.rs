use crate::model::attribute::{diff_attributes, AttributeDiff, AttributeMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Add,
    Modify,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Node,
    Link,
    Stop,
    Route,
    Service,
    Vehicle,
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Add => write!(f, "add"),
            ChangeType::Modify => write!(f, "modify"),
            ChangeType::Remove => write!(f, "remove"),
        }
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectType::Node => write!(f, "node"),
            ObjectType::Link => write!(f, "link"),
            ObjectType::Stop => write!(f, "stop"),
            ObjectType::Route => write!(f, "route"),
            ObjectType::Service => write!(f, "service"),
            ObjectType::Vehicle => write!(f, "vehicle"),
        }
    }
}

/// a single immutable record in the [`super::ChangeLog`].
///
/// for additions that had to be reindexed, `old_id` carries the id originally
/// proposed and `new_id` the id actually committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub timestamp: DateTime<Utc>,
    pub change_event: ChangeType,
    pub object_type: ObjectType,
    pub old_id: Option<String>,
    pub new_id: Option<String>,
    pub old_attributes: Option<AttributeMap>,
    pub new_attributes: Option<AttributeMap>,
    pub diff: Vec<AttributeDiff>,
}

impl ChangeEvent {
    pub fn add(
        object_type: ObjectType,
        proposed_id: Option<&str>,
        id: &str,
        attributes: AttributeMap,
    ) -> ChangeEvent {
        let diff = diff_attributes(&AttributeMap::new(), &attributes);
        let old_id = proposed_id.filter(|p| *p != id).map(String::from);
        ChangeEvent {
            timestamp: Utc::now(),
            change_event: ChangeType::Add,
            object_type,
            old_id,
            new_id: Some(id.to_string()),
            old_attributes: None,
            new_attributes: Some(attributes),
            diff,
        }
    }

    pub fn modify(
        object_type: ObjectType,
        id: &str,
        old_attributes: AttributeMap,
        new_attributes: AttributeMap,
    ) -> ChangeEvent {
        let diff = diff_attributes(&old_attributes, &new_attributes);
        ChangeEvent {
            timestamp: Utc::now(),
            change_event: ChangeType::Modify,
            object_type,
            old_id: Some(id.to_string()),
            new_id: Some(id.to_string()),
            old_attributes: Some(old_attributes),
            new_attributes: Some(new_attributes),
            diff,
        }
    }

    pub fn remove(object_type: ObjectType, id: &str, attributes: AttributeMap) -> ChangeEvent {
        let diff = diff_attributes(&attributes, &AttributeMap::new());
        ChangeEvent {
            timestamp: Utc::now(),
            change_event: ChangeType::Remove,
            object_type,
            old_id: Some(id.to_string()),
            new_id: None,
            old_attributes: Some(attributes),
            new_attributes: None,
            diff,
        }
    }

    /// true if this event involves the given id as either its old or new id.
    pub fn concerns(&self, id: &str) -> bool {
        self.old_id.as_deref() == Some(id) || self.new_id.as_deref() == Some(id)
    }

    pub fn was_reindexed(&self) -> bool {
        self.change_event == ChangeType::Add && self.old_id.is_some()
    }
}
