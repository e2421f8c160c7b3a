//! Registration errors.
//!
//! Every variant is a programmer error in the route table. They are returned
//! from registration so the start-up code decides how to abort; none of them
//! can occur once the router is serving.

use axum::http::Method;
use thiserror::Error;

/// Represents errors that can occur when registering a route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("path must begin with '/' in path '{path}'")]
    MissingLeadingSlash { path: String },

    #[error("handler for path '{path}' not defined")]
    MissingHandler { path: String },

    #[error("empty regexp in path '{path}'")]
    EmptyRegex { path: String },

    #[error("regexp name block not closed with '}}' in path '{path}'")]
    UnclosedRegexName { path: String },

    #[error("regexp compile error in path '{path}': {source}")]
    InvalidRegex {
        path: String,
        #[source]
        source: regex::Error,
    },

    #[error("wildcard must be the last segment in path '{path}'")]
    WildcardNotLast { path: String },

    /// Only one non-raw child (`:name`, `*name` or `#regex`) is allowed per node.
    #[error("segment '{token}' in path '{path}' conflicts with existing segment '{existing}'")]
    ConflictingSegment {
        path: String,
        existing: String,
        token: String,
    },

    #[error("handler for {method} '{path}' redefined")]
    Redefined { method: Method, path: String },

    #[error("path must end with /*filepath in path '{path}'")]
    InvalidFilesPath { path: String },
}

impl RouteError {
    /// The registration path that caused the error.
    pub fn path(&self) -> &str {
        match self {
            RouteError::MissingLeadingSlash { path }
            | RouteError::MissingHandler { path }
            | RouteError::EmptyRegex { path }
            | RouteError::UnclosedRegexName { path }
            | RouteError::InvalidRegex { path, .. }
            | RouteError::WildcardNotLast { path }
            | RouteError::ConflictingSegment { path, .. }
            | RouteError::Redefined { path, .. }
            | RouteError::InvalidFilesPath { path } => path,
        }
    }
}
