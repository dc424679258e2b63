use super::{AttributeError, AttributeMap, AttributeValue};

pub fn expect_f64(key: &str, value: &AttributeValue) -> Result<f64, AttributeError> {
    value
        .as_f64()
        .ok_or_else(|| type_mismatch(key, "a number", value))
}

pub fn type_mismatch(key: &str, expected: &str, found: &AttributeValue) -> AttributeError {
    AttributeError::TypeMismatch {
        key: key.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// deep update of an attribute bag: nested maps merge, anything else overwrites.
pub fn merge_into(target: &mut AttributeMap, update: AttributeMap) {
    for (k, v) in update.into_iter() {
        match (target.get_mut(&k), v) {
            (Some(AttributeValue::Map(existing)), AttributeValue::Map(incoming)) => {
                merge_into(existing, incoming)
            }
            (_, v) => {
                target.insert(k, v);
            }
        }
    }
}
