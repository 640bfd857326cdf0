//! Unified error types.
//!
//! Application-level failures (404, 500) are expressed as HTTP
//! [`Response`](crate::Response) values, not as errors. The types here surface
//! the failures that are allowed to stop startup: a malformed route
//! declaration, an unreadable config file, or a socket that cannot be bound.

use thiserror::Error;

/// A route path that cannot be compiled into a [`RoutePattern`](crate::RoutePattern).
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unclosed placeholder at byte {pos} in `{path}`")]
    Unclosed { path: String, pos: usize },

    #[error("unexpected `>` at byte {pos} in `{path}`")]
    StrayClose { path: String, pos: usize },

    #[error("invalid placeholder name `{name}` in `{path}`")]
    InvalidName { path: String, name: String },

    #[error("duplicate placeholder `{name}` in `{path}`")]
    Duplicate { path: String, name: String },

    #[error("cannot build matcher for `{path}`: {source}")]
    Regex {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// The error type returned by tessera's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("route `{path}` has no methods")]
    NoMethods { path: String },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
