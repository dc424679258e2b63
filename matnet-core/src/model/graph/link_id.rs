use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// network-wide unique identifier of a link. distinct from the multi index that
/// separates parallel links between the same pair of nodes.
#[derive(
    Debug, Default, Clone, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
#[serde(transparent)]
pub struct LinkId(pub String);

impl LinkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        LinkId(value.to_string())
    }
}

impl From<String> for LinkId {
    fn from(value: String) -> Self {
        LinkId(value)
    }
}
