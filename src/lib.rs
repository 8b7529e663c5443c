//! # twitch-bot-config
//!
//! Watches a YAML configuration file and mirrors its values into Redis, so a
//! Twitch/IRC bot and its collaborators can read live configuration without
//! restarting.
//!
//! ## Overview
//!
//! Two pieces cooperate:
//! - A key-value publisher ([`store`]) with typed get/set operations and one
//!   bulk "publish configuration" operation driven by a static key registry.
//! - A config watcher ([`sync`] + [`watch`]) that loads `twitch-bot.yaml`,
//!   publishes it once, and republishes on every file change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twitch_bot_config::prelude::*;
//!
//! # async fn example() -> twitch_bot_config::error::Result<()> {
//! let settings = StoreSettings::from_env();
//! let store = RedisStore::connect(&settings)?;
//!
//! let path = twitch_bot_config::document::resolve_config_file()?;
//! let sync = ConfigSync::load(&path, store)?;
//!
//! // Initial publish, then republish on every file change.
//! sync.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Synchronization contract
//!
//! - Store key = document dot-path, verbatim; values are string-encoded
//!   scalars (booleans as 1/0) or sets of strings, with no expiration.
//! - Keys absent from the document publish their type's zero value.
//! - List keys are written with a set-add: members removed from the file are
//!   never removed from the store.
//! - A malformed file is fatal at startup; on a later reload it is logged and
//!   the previous in-memory configuration is retained.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod document;
pub mod error;
pub mod registry;
pub mod store;
pub mod sync;
pub mod watch;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::document::Document;
    pub use crate::error::{Result, SyncError};
    pub use crate::registry::{KeySpec, ValueKind};
    pub use crate::store::{KeyValueStore, RedisStore, StoreSettings, publish_all};
    pub use crate::sync::ConfigSync;
}
