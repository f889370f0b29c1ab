//! Commonly used imports and re-exports.
pub use crate::api::method::{MethodCall, to_camel_case};
pub use crate::api::net::{ConnectionPool, Transport};
pub use crate::api::ratelimit::{PacerStats, RequestPacer};
pub use crate::api::types::*;
pub use crate::api::{Api, ApiBuilder};
pub use crate::error::*;
