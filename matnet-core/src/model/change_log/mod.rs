mod change_event;
#[allow(clippy::module_inception)]
mod change_log;

pub use change_event::{ChangeEvent, ChangeType, ObjectType};
pub use change_log::{ChangeLog, ChangeLogSink, DiscardChanges};
