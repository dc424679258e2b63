pub mod components;
pub mod merge;
pub mod search;
pub mod simplification;
