mod network;
mod network_error;

pub use network::{MergeSummary, Network};
pub use network_error::NetworkError;
