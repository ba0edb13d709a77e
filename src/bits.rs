// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Flag-word interleaving
//!
//! Every token starts with one or more flag bits. Flag bits are collected
//! sixteen at a time into a little-endian word, and the raw payload bytes of
//! the tokens in that group follow the word in the output.

use crate::constants::*;
use crate::error::{Error, Result};

/// Accumulates flag bits and the raw bytes that belong to the same group.
///
/// A full group is only written out when the next bit arrives, so raw bytes
/// pushed right after the 16th bit still travel with that group.
pub struct FlagWriter {
    flag: u16,
    flag_size: u8,
    pending: Vec<u8>,
}

impl FlagWriter {
    pub fn new() -> Self {
        FlagWriter {
            flag: 0,
            flag_size: 0,
            pending: Vec::with_capacity(MAX_PENDING_RAW),
        }
    }

    /// Push one flag bit, first flushing the previous group if it is full.
    /// Returns the number of bytes written to `out`.
    pub fn put_bit(&mut self, bit: bool, out: &mut Vec<u8>) -> usize {
        let mut written = 0;

        if self.flag_size == FLAG_BITS {
            out.extend_from_slice(&self.flag.to_le_bytes());
            out.extend_from_slice(&self.pending);
            written = 2 + self.pending.len();

            self.flag = 0;
            self.flag_size = 0;
            self.pending.clear();
        }

        // First pushed bit ends up in bit 0 once the group is full
        self.flag = (self.flag >> 1) | ((bit as u16) << 15);
        self.flag_size += 1;

        written
    }

    /// Queue a raw payload byte; it is written with the current group.
    pub fn put_raw(&mut self, byte: u8) {
        debug_assert!(self.pending.len() < MAX_PENDING_RAW);
        self.pending.push(byte);
    }

    /// Pad with zero bits until the current group has been written.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        while self.put_bit(false, out) == 0 {}
    }
}

impl Default for FlagWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads flag bits and raw bytes from a token stream, refilling the flag
/// word on demand from the same cursor as the raw bytes.
pub struct FlagReader<'a> {
    src: &'a [u8],
    pos: usize,
    flag: u16,
    remaining: u8,
}

impl<'a> FlagReader<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        FlagReader {
            src,
            pos: 0,
            flag: 0,
            remaining: 0,
        }
    }

    pub fn bit(&mut self) -> Result<bool> {
        if self.remaining == 0 {
            self.flag = self.word()?;
            self.remaining = FLAG_BITS;
        }

        let bit = self.flag & 1 != 0;
        self.flag >>= 1;
        self.remaining -= 1;
        Ok(bit)
    }

    pub fn byte(&mut self) -> Result<u8> {
        let b = *self.src.get(self.pos).ok_or(Error::TruncatedStream)?;
        self.pos += 1;
        Ok(b)
    }

    pub fn word(&mut self) -> Result<u16> {
        let lo = self.byte()?;
        let hi = self.byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}
