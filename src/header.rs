// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The 6-byte HSQ file header
//!
//! ```text
//! 0..3  decompressed size, 24-bit little-endian
//! 3..5  compressed size including the header, 16-bit little-endian
//! 5     checksum: all six bytes sum to 0xAB (mod 256)
//! ```

use crate::constants::*;
use crate::error::{Error, Result};

/// Sizes recorded in an HSQ header
///
/// Only `new` and `parse` build a header, so both sizes always fit their
/// fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    decompressed_len: usize,
    compressed_len: usize,
}

impl Header {
    /// Create a header, rejecting sizes that do not fit their fields
    pub fn new(decompressed_len: usize, compressed_len: usize) -> Result<Self> {
        if decompressed_len > MAX_DECOMPRESSED_SIZE || compressed_len > MAX_COMPRESSED_SIZE {
            return Err(Error::InputTooLarge);
        }

        Ok(Header {
            decompressed_len,
            compressed_len,
        })
    }

    /// Size of the original data
    pub fn decompressed_len(&self) -> usize {
        self.decompressed_len
    }

    /// Size of the whole file, header included
    pub fn compressed_len(&self) -> usize {
        self.compressed_len
    }

    /// Checksum byte for the five size bytes
    pub fn checksum(fields: &[u8]) -> u8 {
        fields
            .iter()
            .fold(HEADER_CHECKSUM, |sum, &b| sum.wrapping_sub(b))
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let d = (self.decompressed_len as u32).to_le_bytes();
        let c = (self.compressed_len as u16).to_le_bytes();

        let mut out = [d[0], d[1], d[2], c[0], c[1], 0];
        out[5] = Self::checksum(&out[..5]);
        out
    }

    /// Parse and validate the header at the start of `src`.
    ///
    /// The checksum is verified before any field is interpreted.
    pub fn parse(src: &[u8]) -> Result<Self> {
        if src.len() < HEADER_SIZE {
            return Err(Error::TruncatedStream);
        }

        if Self::checksum(&src[..5]) != src[5] {
            return Err(Error::CorruptHeader);
        }

        let decompressed_len = u32::from_le_bytes([src[0], src[1], src[2], 0]) as usize;
        let compressed_len = u16::from_le_bytes([src[3], src[4]]) as usize;

        if compressed_len < HEADER_SIZE {
            return Err(Error::CorruptHeader);
        }

        Ok(Header {
            decompressed_len,
            compressed_len,
        })
    }
}
