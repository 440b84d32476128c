//! Unified error type.

use std::net::AddrParseError;

use thiserror::Error;

use crate::method::Method;
use crate::pattern::PatternError;

/// The error type returned by kite's fallible operations.
///
/// Application-level outcomes (404, a handler's `fail`) are expressed as
/// HTTP [`Response`](crate::Response) values, not as `Error`s. This type
/// surfaces startup failures: a rejected route pattern, an unparsable bind
/// address, or the listener failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`")]
    Address {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid route `{method} {pattern}`: {source}")]
    Route {
        method: Method,
        pattern: String,
        #[source]
        source: PatternError,
    },
}
