//! Fixed-size block chunker
//!
//! Cuts a byte source into ordered blocks of exactly `block_size` bytes,
//! except the final block which may be shorter. Blocks are materialized one
//! at a time; the source is never buffered whole.

use tokio::io::{AsyncRead, AsyncReadExt};

/// Default block size: 1 MiB
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// Chunker error type
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("block size must be non-zero")]
    InvalidBlockSize,
    #[error("source read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One contiguous byte range of the source. Immutable once cut; order is
/// part of the content identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Position in the block sequence, starting at 0
    pub index: u64,
    /// Raw block bytes
    pub data: Vec<u8>,
}

/// Lazy block cutter over an async byte source
#[derive(Debug)]
pub struct Chunker<R> {
    source: R,
    block_size: usize,
    next_index: u64,
    eof: bool,
}

impl<R: AsyncRead + Unpin> Chunker<R> {
    pub fn new(source: R, block_size: usize) -> Result<Self, ChunkError> {
        if block_size == 0 {
            return Err(ChunkError::InvalidBlockSize);
        }
        Ok(Self {
            source,
            block_size,
            next_index: 0,
            eof: false,
        })
    }

    /// Cut the next block from the source.
    ///
    /// Returns `Ok(None)` once the source is exhausted. Every block holds
    /// exactly `block_size` bytes except possibly the last.
    pub async fn next_block(&mut self) -> Result<Option<Block>, ChunkError> {
        if self.eof {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.block_size];
        let mut filled = 0;

        while filled < self.block_size {
            let n = self.source.read(&mut buf[filled..]).await?;
            if n == 0 {
                self.eof = true;
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        let block = Block {
            index: self.next_index,
            data: buf,
        };
        self.next_index += 1;
        Ok(Some(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    async fn collect(data: Vec<u8>, block_size: usize) -> Vec<Block> {
        let mut chunker = Chunker::new(Cursor::new(data), block_size).unwrap();
        let mut blocks = Vec::new();
        while let Some(block) = chunker.next_block().await.unwrap() {
            blocks.push(block);
        }
        blocks
    }

    #[tokio::test]
    async fn test_exact_multiple() {
        let blocks = collect(vec![7u8; 300], 100).await;
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.data.len() == 100));
        assert_eq!(
            blocks.iter().map(|b| b.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn test_short_last_block() {
        let data: Vec<u8> = (0..250).map(|i| (i % 256) as u8).collect();
        let blocks = collect(data.clone(), 100).await;
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].data.len(), 100);
        assert_eq!(blocks[1].data.len(), 100);
        assert_eq!(blocks[2].data.len(), 50);

        // Covers the source exactly once, in order
        let rejoined: Vec<u8> = blocks.into_iter().flat_map(|b| b.data).collect();
        assert_eq!(rejoined, data);
    }

    #[tokio::test]
    async fn test_single_short_block() {
        let blocks = collect(vec![1, 2, 3], 100).await;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let blocks = collect(vec![], 100).await;
        assert!(blocks.is_empty());
    }

    #[tokio::test]
    async fn test_zero_block_size_rejected() {
        let err = Chunker::new(Cursor::new(vec![1u8]), 0).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidBlockSize));
    }

    #[tokio::test]
    async fn test_exhausted_stays_exhausted() {
        let mut chunker = Chunker::new(Cursor::new(vec![1u8, 2]), 100).unwrap();
        assert!(chunker.next_block().await.unwrap().is_some());
        assert!(chunker.next_block().await.unwrap().is_none());
        assert!(chunker.next_block().await.unwrap().is_none());
    }
}
