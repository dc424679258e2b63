//! files kept alongside a network (e.g. link or node keyed lookups) whose
//! references must follow the network through reindexing and simplification.
mod json_remap;

pub use json_remap::{remap_json_references, simplification_lookup};
