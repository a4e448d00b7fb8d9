//! Merkle addressor
//!
//! Builds a binary hash tree over an ordered block sequence:
//! leaf = SHA256(block bytes), internal = SHA256(left ‖ right).
//!
//! Pairing rule for an odd node count at any level: the unpaired digest is
//! promoted unchanged to the next level. This never hashes the same child
//! twice and makes a single-block blob's root equal to its block digest.
//! The rule is part of the addressing format; changing it changes every
//! root for odd block counts.

use sha2::{Digest, Sha256};
use tokio::io::AsyncRead;

use crate::chunker::{ChunkError, Chunker};
use crate::types::Hash;

/// Addressor error type
#[derive(Debug, thiserror::Error)]
pub enum AddressingError {
    #[error("cannot address an empty input")]
    EmptyInput,
    #[error("block enumeration failed: {0}")]
    Chunk(#[from] ChunkError),
}

/// Compute SHA256 of data
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Incremental Merkle tree builder.
///
/// Feed blocks in order with [`push`](Self::push), then [`finalize`](Self::finalize)
/// into the root. Deterministic: the same block sequence always yields the
/// same root.
#[derive(Debug, Default)]
pub struct MerkleBuilder {
    leaves: Vec<Hash>,
}

impl MerkleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the digest of the next block
    pub fn push(&mut self, block: &[u8]) {
        self.leaves.push(sha256(block));
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Fold the leaves into the root hash.
    ///
    /// Zero blocks is a defined error: an empty blob has no root under the
    /// promote pairing rule.
    pub fn finalize(self) -> Result<Hash, AddressingError> {
        if self.leaves.is_empty() {
            return Err(AddressingError::EmptyInput);
        }

        let mut level = self.leaves;
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_pair(left, right)),
                    // Odd node: promoted unchanged
                    [single] => next.push(*single),
                    _ => unreachable!(),
                }
            }
            level = next;
        }

        Ok(level[0])
    }
}

/// An addressed blob: root digest plus layout facts. Owned transiently by
/// one upload; nothing is retained after the submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressedBlob {
    /// Merkle root over the block sequence
    pub root: Hash,
    /// Total byte length
    pub size: u64,
    /// Number of blocks cut
    pub blocks: u64,
}

/// Chunk a byte source and fold it into an addressed blob in one pass.
///
/// Each block is materialized from the source on demand, hashed, and
/// dropped; memory use is bounded by one block.
pub async fn address_blob<R: AsyncRead + Unpin>(
    source: R,
    block_size: usize,
) -> Result<AddressedBlob, AddressingError> {
    let mut chunker = Chunker::new(source, block_size)?;
    let mut builder = MerkleBuilder::new();
    let mut size = 0u64;
    let mut blocks = 0u64;

    while let Some(block) = chunker.next_block().await? {
        size += block.data.len() as u64;
        blocks += 1;
        builder.push(&block.data);
    }

    let root = builder.finalize()?;
    Ok(AddressedBlob { root, size, blocks })
}
