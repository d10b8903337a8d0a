//! Async host for the Bancho packet codec.
//!
//! Wires the `wire` framer to a tokio TCP listener: configuration comes from
//! a JSON file, received packets are published as [`ServerEvent`]s through an
//! [`EventManager`], and per-host traffic is tracked in an [`LruCache`].

mod cache;
mod config;
mod events;
mod server;

pub use cache::LruCache;
pub use config::{load_or_init, Config, ConfigError, ConfigLoad, ConfigResult};
pub use events::{EventHandler, EventManager};
pub use server::{PeerStats, PeerTable, Server, ServerError, ServerEvent, ServerResult};
