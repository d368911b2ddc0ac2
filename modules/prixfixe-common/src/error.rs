use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrixFixeError {
    #[error("no handler assigned to message type {0}")]
    UnknownDataType(String),

    #[error("{data_type} message is missing its {field} field")]
    MissingField {
        data_type: &'static str,
        field: &'static str,
    },

    #[error("{data_type} is not carried by {envelope} messages")]
    UnsupportedDataType {
        data_type: &'static str,
        envelope: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}
