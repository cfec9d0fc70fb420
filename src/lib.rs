//! shinebridge - battery telemetry bridge library
//!
//! This library polls the Shine battery cloud for per-device telemetry and
//! republishes the latest snapshot of every device over a local read-only
//! HTTP endpoint.
//!
//! # Architecture
//!
//! - `auth`: credential encoding, session lifecycle, and token persistence
//! - `vendor`: the remote API seam (`VendorApi`) and its HTTP implementation
//! - `cache`: the derived domain records and the shared device cache
//! - `poller`: the periodic fetch-and-merge cycle driver
//! - `server`: the local read endpoint
//! - `config` / `cli`: startup configuration
//! - `error`: error types and result alias

pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod poller;
pub mod server;
pub mod vendor;

// Re-export commonly used types
pub use cache::{CacheEntry, DeviceCache};
pub use config::Config;
pub use error::{Result, ShinebridgeError};
pub use poller::Poller;
pub use vendor::{ShineClient, VendorApi};
