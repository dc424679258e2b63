use super::MatnetCliError;
use csv::QuoteStyle;
use itertools::Itertools;
use matnet_core::model::{
    attribute::AttributeMap,
    change_log::{ChangeEvent, ChangeLog},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// flat CSV representation of a [`ChangeEvent`]. attribute maps are written as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogRow {
    pub timestamp: String,
    pub change_event: String,
    pub object_type: String,
    pub old_id: Option<String>,
    pub new_id: Option<String>,
    pub old_attributes: Option<String>,
    pub new_attributes: Option<String>,
    pub diff: String,
}

impl TryFrom<&ChangeEvent> for ChangeLogRow {
    type Error = MatnetCliError;

    fn try_from(event: &ChangeEvent) -> Result<Self, Self::Error> {
        let to_json = |m: &AttributeMap| serde_json::to_string(m);
        Ok(ChangeLogRow {
            timestamp: event.timestamp.to_rfc3339(),
            change_event: event.change_event.to_string(),
            object_type: event.object_type.to_string(),
            old_id: event.old_id.clone(),
            new_id: event.new_id.clone(),
            old_attributes: event.old_attributes.as_ref().map(to_json).transpose()?,
            new_attributes: event.new_attributes.as_ref().map(to_json).transpose()?,
            diff: event.diff.iter().join("; "),
        })
    }
}

/// writes every event of the log, in order, to a CSV file.
pub fn write_change_log(log: &ChangeLog, path: &Path, overwrite: bool) -> Result<usize, MatnetCliError> {
    if path.exists() && !overwrite {
        return Err(MatnetCliError::OutputError(format!(
            "{} already exists, set overwrite to replace it",
            path.to_string_lossy()
        )));
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .from_path(path)?;
    for event in log.iter() {
        writer.serialize(ChangeLogRow::try_from(event)?)?;
    }
    writer.flush()?;
    Ok(log.len())
}

#[cfg(test)]
mod tests {
    use super::ChangeLogRow;
    use matnet_core::model::{
        attribute::{AttributeMap, AttributeValue},
        change_log::{ChangeEvent, ObjectType},
    };

    #[test]
    fn test_modify_row() {
        let old = AttributeMap::from([(String::from("capacity"), AttributeValue::Float(600.0))]);
        let new = AttributeMap::from([(String::from("capacity"), AttributeValue::Float(900.0))]);
        let event = ChangeEvent::modify(ObjectType::Link, "ab", old, new);
        let row = ChangeLogRow::try_from(&event).unwrap();
        assert_eq!(row.object_type, "link");
        assert_eq!(row.old_id.as_deref(), Some("ab"));
        assert!(row.diff.contains("capacity"));
        assert!(row.new_attributes.unwrap().contains("900"));
    }
}
