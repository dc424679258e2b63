use super::{ChangeEvent, ObjectType};
use serde::{Deserialize, Serialize};

/// destination for mutation records. mutating operations receive a sink rather
/// than reaching for a shared log.
pub trait ChangeLogSink {
    fn record(&mut self, event: ChangeEvent);
}

/// append-only, ordered history of every mutation applied to a network and its
/// schedule. entries cannot be edited or removed once recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeLog {
    events: Vec<ChangeEvent>,
}

/// sink used when building derived structures (subgraphs, previews) whose
/// construction is not a change to the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardChanges;

impl ChangeLog {
    pub fn new() -> ChangeLog {
        ChangeLog { events: vec![] }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&ChangeEvent> {
        self.events.last()
    }

    /// all events for an object kind that mention the given id.
    pub fn events_for<'a>(
        &'a self,
        object_type: ObjectType,
        id: &'a str,
    ) -> impl Iterator<Item = &'a ChangeEvent> + 'a {
        self.events
            .iter()
            .filter(move |e| e.object_type == object_type && e.concerns(id))
    }

    /// moves every event of another log onto the end of this one, preserving order.
    pub fn absorb(&mut self, other: ChangeLog) {
        self.events.extend(other.events);
    }
}

impl ChangeLogSink for ChangeLog {
    fn record(&mut self, event: ChangeEvent) {
        log::debug!(
            "change log: {} {} {:?} -> {:?}",
            event.change_event,
            event.object_type,
            event.old_id,
            event.new_id
        );
        self.events.push(event);
    }
}

impl ChangeLogSink for DiscardChanges {
    fn record(&mut self, _event: ChangeEvent) {}
}

#[cfg(test)]
mod tests {
    use super::{ChangeLog, ChangeLogSink};
    use crate::model::{
        attribute::{AttributeMap, AttributeValue},
        change_log::{ChangeEvent, ChangeType, ObjectType},
    };

    #[test]
    fn test_records_in_order_and_filters() {
        let mut log = ChangeLog::new();
        let attrs = AttributeMap::from([(String::from("x"), AttributeValue::Float(1.0))]);
        log.record(ChangeEvent::add(ObjectType::Node, Some("1"), "2", attrs.clone()));
        log.record(ChangeEvent::remove(ObjectType::Node, "2", attrs));

        assert_eq!(log.len(), 2);
        let first = log.iter().next().unwrap();
        assert!(first.was_reindexed());
        assert_eq!(first.old_id.as_deref(), Some("1"));
        assert_eq!(first.new_id.as_deref(), Some("2"));
        assert_eq!(log.last().unwrap().change_event, ChangeType::Remove);
        assert_eq!(log.events_for(ObjectType::Node, "2").count(), 2);
        assert_eq!(log.events_for(ObjectType::Link, "2").count(), 0);
    }
}
