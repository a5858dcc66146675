pub mod action;
pub mod domain;
pub mod expression;
pub mod predicate;
pub mod problem;

mod parser;
pub mod utils;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Domain parse error: {0}")]
    DomainParse(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("In file included from {0}:\n{1}")]
    FromFile(String, Box<Error>),
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedExpression(msg.into())
    }

    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        Self::DomainParse(msg.into())
    }
}
