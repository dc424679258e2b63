use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("unknown attribute class '{0}'")]
    UnknownClass(String),
    #[error("value '{text}' cannot be decoded as class '{class}'")]
    InvalidTypedValue { class: String, text: String },
    #[error("attribute '{key}' expects {expected} but found '{found}'")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },
    #[error("attribute '{0}' identifies the element and cannot be modified")]
    ImmutableField(String),
}
