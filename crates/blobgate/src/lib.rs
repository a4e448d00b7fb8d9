//! Blobgate - HTTP file storage gateway
//!
//! Accepts file uploads, stages them on disk, derives a Merkle root over
//! fixed-size blocks, and submits the addressed blob to a remote storage
//! network. Blobs are retrieved later by root hash and streamed back
//! without full buffering.
//!
//! Request flow:
//!
//! ```text
//! POST /storage/upload  -> staging -> chunker -> merkle root -> network submit
//!                          response { rootHash, txHash, originalName, size }
//! GET  /storage/download/:root_hash -> network stream -> caller
//! ```

pub mod config;
pub mod download;
pub mod server;
pub mod staging;
pub mod upload;

pub use config::{Config, ConfigError};
pub use server::GatewayServer;
pub use staging::{StagedFile, StagingArea};
