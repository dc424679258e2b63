pub mod attribute;
pub mod auxiliary;
pub mod change_log;
pub mod graph;
pub mod network;
pub mod schedule;
