//! Podserve - podcast feed server for a directory of audio files
//!
//! The library holds the whole service so integration tests can drive it:
//! the catalog builder, the snapshot store, the refresh loop, and the HTTP
//! handlers. The `podserve` binary only adds the command line.

pub mod catalog;
pub mod config;
pub mod error;
pub mod refresh;
pub mod server;
pub mod store;

pub use error::{Error, Result};
