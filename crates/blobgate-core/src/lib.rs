//! Blobgate core - chunking and Merkle content addressing
//!
//! Splits a byte source into fixed-size blocks and derives a binary Merkle
//! root over them: SHA256(block) at the leaves, SHA256(left ‖ right) at the
//! internal nodes. The root is the permanent content identifier for the
//! exact byte content and block layout.
//!
//! # Example
//!
//! ```rust
//! use blobgate_core::{address_blob, to_hex, DEFAULT_BLOCK_SIZE};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = b"Hello, World!".to_vec();
//!     let blob = address_blob(std::io::Cursor::new(data), DEFAULT_BLOCK_SIZE).await?;
//!
//!     assert_eq!(blob.blocks, 1);
//!     println!("root: {}", to_hex(&blob.root));
//!     Ok(())
//! }
//! ```

pub mod chunker;
pub mod merkle;
pub mod types;

pub use chunker::{Block, ChunkError, Chunker, DEFAULT_BLOCK_SIZE};
pub use merkle::{address_blob, sha256, AddressedBlob, AddressingError, MerkleBuilder};
pub use types::{from_hex, to_hex, Hash, UploadReceipt};
