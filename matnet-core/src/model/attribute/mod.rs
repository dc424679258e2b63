mod attribute_condition;
mod attribute_diff;
mod attribute_error;
mod attribute_ops;
mod attribute_value;

pub use attribute_condition::{AttributeCondition, ConditionSet, MatchMode};
pub use attribute_diff::{diff_attributes, AttributeDiff, DiffOp};
pub use attribute_error::AttributeError;
pub use attribute_ops::{expect_f64, merge_into, type_mismatch};
pub use attribute_value::{AttributeMap, AttributeValue};
