#![forbid(unsafe_code)]
//! # VK Quick
//! Client for the [VK API] methods.
//! Asynchronous requests are based on [`reqwest`] and [`tokio`].
//! JSON Serialization and Deserialization [`serde_json`].
//!
//! ```toml
//! [dependencies]
//! vkquick = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ```no_run
//! use vkquick::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = Api::new("mytoken").await?;
//!     let users = api.call("users.get", [("user_ids", vec![1, 2])]).await?;
//!     println!("{users}");
//!     Ok(())
//! }
//! ```
//!
//! [VK API]: https://dev.vk.com/method
//! [`reqwest`]: https://docs.rs/reqwest
//! [`tokio`]: https://docs.rs/tokio
//! [`serde_json`]: https://docs.rs/serde_json

pub mod api;
pub mod config;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod prelude;

pub use self::api::types::peer;
pub use self::api::{Api, ApiBuilder};
