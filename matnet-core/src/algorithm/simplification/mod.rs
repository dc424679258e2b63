mod link_fusion;
mod simplified_path;
mod simplify_error;
mod simplify_ops;

pub use link_fusion::{fuse_path, SIMPLIFIED_IDS_KEY};
pub use simplified_path::SimplifiedPath;
pub use simplify_error::SimplifyError;
pub use simplify_ops::{node_is_endpoint, simplify_graph};
