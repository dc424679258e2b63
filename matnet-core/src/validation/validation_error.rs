use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("cannot validate a network with an empty graph")]
    EmptyGraph,
}
