use crate::model::graph::LinkId;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// replaces every string value found in `mapping` with its mapped id, at any
/// depth of the document. object keys are left as they are.
///
/// # Returns
///
/// the number of values replaced
pub fn remap_json_references(value: &mut Value, mapping: &HashMap<String, String>) -> usize {
    match value {
        Value::String(s) => match mapping.get(s.as_str()) {
            Some(new_id) => {
                *s = new_id.clone();
                1
            }
            None => 0,
        },
        Value::Array(values) => values
            .iter_mut()
            .map(|v| remap_json_references(v, mapping))
            .sum(),
        Value::Object(map) => map
            .values_mut()
            .map(|v| remap_json_references(v, mapping))
            .sum(),
        _ => 0,
    }
}

/// string keyed view of a link id mapping, for use with [`remap_json_references`].
pub fn simplification_lookup(mapping: &IndexMap<LinkId, LinkId>) -> HashMap<String, String> {
    mapping
        .iter()
        .map(|(old, new)| (old.to_string(), new.to_string()))
        .collect()
}
