mod adjacency_direction;
mod graph_error;
mod id_generator;
mod link_data;
mod link_id;
mod node_data;
mod node_id;
mod projection;
mod spatial_graph;

pub use adjacency_direction::AdjacencyDirection;
pub use graph_error::GraphError;
pub use id_generator::IdGenerator;
pub use link_data::LinkData;
pub use link_id::LinkId;
pub use node_data::NodeData;
pub use node_id::NodeId;
pub use projection::{spatial_token, Projection};
pub use spatial_graph::{connected_node_ids, AdjacencyList, LinkSlot, MultiEdges, SpatialGraph};
