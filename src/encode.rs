// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::{self, Read};

use crate::bits::FlagWriter;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::header::Header;
use crate::window::find_match;

/// Streaming HSQ encoder
///
/// Input is compressed in `FILE_CHUNK` units. Each unit sits behind the last
/// `WINDOW_BIG` bytes of the previous one, so back-references can reach
/// across chunk boundaries while only one chunk is resident.
///
/// # Example
///
/// ```
/// use hsq::{decode, Encoder};
///
/// let mut encoder = Encoder::new();
/// encoder.write(b"Hello, ").unwrap();
/// encoder.write(b"Hello, World!").unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// assert_eq!(decode(&compressed).unwrap(), b"Hello, Hello, World!");
/// ```
pub struct Encoder {
    /// `[history | fresh data]`
    chunk: Vec<u8>,
    filled: usize,
    history_start: usize,
    total_in: usize,
    tokens: TokenWriter,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Encoder {
            chunk: vec![0u8; WINDOW_BIG + FILE_CHUNK],
            filled: 0,
            // Nothing before the first chunk may be referenced
            history_start: WINDOW_BIG,
            total_in: 0,
            tokens: TokenWriter::new(),
        }
    }

    /// Feed more input. Every chunk that fills up is compressed immediately.
    pub fn write(&mut self, mut data: &[u8]) -> Result<()> {
        if data.len() > MAX_DECOMPRESSED_SIZE - self.total_in {
            return Err(Error::InputTooLarge);
        }
        self.total_in += data.len();

        while !data.is_empty() {
            let n = data.len().min(FILE_CHUNK - self.filled);
            let at = WINDOW_BIG + self.filled;
            self.chunk[at..at + n].copy_from_slice(&data[..n]);
            self.filled += n;
            data = &data[n..];

            if self.filled == FILE_CHUNK {
                self.flush_chunk()?;
            }
        }

        Ok(())
    }

    /// Compress the buffered chunk and keep its tail as the next history.
    fn flush_chunk(&mut self) -> Result<()> {
        let end = WINDOW_BIG + self.filled;
        compress_chunk(
            &self.chunk[..end],
            self.history_start,
            WINDOW_BIG,
            &mut self.tokens,
        )?;

        self.chunk.copy_within(end - WINDOW_BIG..end, 0);
        self.history_start = 0;
        self.filled = 0;
        Ok(())
    }

    /// Compress whatever is left, terminate the stream and prepend the header.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.flush_chunk()?;
        self.tokens.end();

        let body = self.tokens.finish();
        let header = Header::new(self.total_in, HEADER_SIZE + body.len())?;

        let mut dst = Vec::with_capacity(HEADER_SIZE + body.len());
        dst.extend_from_slice(&header.to_bytes());
        dst.extend_from_slice(&body);
        Ok(dst)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode returns the HSQ file for src.
/// The output is byte-identical to the original Cryo packer.
pub fn encode(src: &[u8]) -> Result<Vec<u8>> {
    if src.len() > MAX_DECOMPRESSED_SIZE {
        return Err(Error::InputTooLarge);
    }

    let mut encoder = Encoder::new();
    encoder.write(src)?;
    encoder.finish()
}

/// Encode everything `reader` yields, reading one chunk at a time.
pub fn encode_reader<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    let mut buf = vec![0u8; FILE_CHUNK];

    loop {
        let n = read_full(&mut reader, &mut buf)?;
        encoder.write(&buf[..n])?;
        // A short read marks the end of input, including the empty read
        // after an exact multiple of the chunk size
        if n < FILE_CHUNK {
            break;
        }
    }

    encoder.finish()
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

/// Returns the maximum length of an HSQ file for `src_len` input bytes
pub fn max_encoded_len(src_len: usize) -> Result<usize> {
    if src_len > MAX_DECOMPRESSED_SIZE {
        return Err(Error::InputTooLarge);
    }

    // All literals: one flag bit and one raw byte each, plus the sentinel
    // and a padded final flag word
    Ok(HEADER_SIZE + src_len + 3 + 2 * (src_len / FLAG_BITS as usize + 2))
}

/// The uncommitted run under consideration, `buf[begin..end]`
struct Lookahead {
    begin: usize,
    end: usize,
}

impl Lookahead {
    fn size(&self) -> usize {
        self.end - self.begin
    }

    /// Commit the run minus its last byte, which broke the match.
    ///
    /// A pointer is only worth it for runs of three or more, or two bytes
    /// within the small window; otherwise only the first byte is emitted as
    /// a literal and the rest is scanned again. Either way the lookahead is
    /// left empty at the first unconsumed byte.
    fn commit(
        &mut self,
        buf: &[u8],
        history_start: usize,
        tokens: &mut TokenWriter,
    ) -> Result<()> {
        let size = self.size();
        let found = find_match(buf, history_start, self.begin, self.end - 1, WINDOW_BIG);

        match found {
            Some(pos) if size > 3 || (size == 3 && self.begin - pos <= WINDOW_SMALL) => {
                tokens.pointer(self.begin - pos, size - 1)?;
                self.begin += size - 1;
                self.end -= 1;
            }
            _ => {
                tokens.literal(buf[self.begin]);
                self.begin += 1;
                self.end = self.begin;
            }
        }

        Ok(())
    }
}

/// Compress `buf[fresh_start..]`, allowing references back to `history_start`.
fn compress_chunk(
    buf: &[u8],
    history_start: usize,
    fresh_start: usize,
    tokens: &mut TokenWriter,
) -> Result<()> {
    let mut look = Lookahead {
        begin: fresh_start,
        end: fresh_start,
    };

    // Grow the run one byte at a time for as long as it still occurs earlier
    while look.end < buf.len() {
        look.end += 1;

        let found = find_match(buf, history_start, look.begin, look.end, WINDOW_BIG);
        if found.is_none() || look.size() > MAX_MATCH {
            look.commit(buf, history_start, tokens)?;
            tokens.check_limit()?;
        }
    }

    if look.size() != 0 {
        look.commit(buf, history_start, tokens)?;
    }

    // Whatever the last commit handed back goes out unmatched
    while look.end < buf.len() {
        tokens.literal(buf[look.end]);
        look.end += 1;
    }

    tokens.check_limit()
}

/// Turns literals and pointers into flag bits and raw bytes
struct TokenWriter {
    flags: FlagWriter,
    out: Vec<u8>,
}

impl TokenWriter {
    fn new() -> Self {
        TokenWriter {
            flags: FlagWriter::new(),
            out: Vec::new(),
        }
    }

    fn bit(&mut self, bit: bool) {
        self.flags.put_bit(bit, &mut self.out);
    }

    fn literal(&mut self, byte: u8) {
        self.bit(true);
        self.flags.put_raw(byte);
    }

    fn pointer(&mut self, offset: usize, length: usize) -> Result<()> {
        if !(1..=WINDOW_BIG).contains(&offset) || !(MIN_MATCH..=MAX_MATCH).contains(&length) {
            return Err(Error::InvalidBackReference);
        }

        if length <= MAX_SMALL_MATCH && offset <= WINDOW_SMALL {
            let code = length - MIN_MATCH;
            self.bit(false);
            self.bit(false);
            self.bit(code & 2 != 0);
            self.bit(code & 1 != 0);
            // 0 stands for offset 256
            self.flags.put_raw((WINDOW_SMALL - offset) as u8);
            return Ok(());
        }

        // Length code 0 announces an extra length byte, so a 2-byte run has
        // no big-window form
        if length == MIN_MATCH {
            return Err(Error::InvalidBackReference);
        }

        let code = if length <= MAX_INLINE_MATCH {
            length - MIN_MATCH
        } else {
            0
        };
        let word = (((WINDOW_BIG - offset) << 3) | code) as u16;

        self.bit(false);
        self.bit(true);
        for b in word.to_le_bytes() {
            self.flags.put_raw(b);
        }
        if length > MAX_INLINE_MATCH {
            self.flags.put_raw((length - MIN_MATCH) as u8);
        }

        Ok(())
    }

    /// Big-window pointer with an all-zero payload
    fn end(&mut self) {
        self.bit(false);
        self.bit(true);
        for _ in 0..3 {
            self.flags.put_raw(0);
        }
    }

    fn check_limit(&self) -> Result<()> {
        if HEADER_SIZE + self.out.len() > MAX_COMPRESSED_SIZE {
            return Err(Error::InputTooLarge);
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<u8> {
        self.flags.finish(&mut self.out);
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut TokenWriter)) -> Vec<u8> {
        let mut tokens = TokenWriter::new();
        f(&mut tokens);
        tokens.finish()
    }

    #[test]
    fn test_literal() {
        assert_eq!(emit(|t| t.literal(0x41)), vec![0x01, 0x00, 0x41]);
    }

    #[test]
    fn test_small_pointer() {
        assert_eq!(
            emit(|t| t.pointer(1, 2).unwrap()),
            vec![0x00, 0x00, 0xff]
        );
        // Flag bits 0,0,1,1; offset 256 wraps to 0
        assert_eq!(
            emit(|t| t.pointer(256, 5).unwrap()),
            vec![0x0c, 0x00, 0x00]
        );
    }

    #[test]
    fn test_big_pointer() {
        // (8191 << 3) | 1
        assert_eq!(
            emit(|t| t.pointer(1, 3).unwrap()),
            vec![0x02, 0x00, 0xf9, 0xff]
        );
        // Small offset but too long for the small form
        assert_eq!(
            emit(|t| t.pointer(1, 6).unwrap()),
            vec![0x02, 0x00, 0xfc, 0xff]
        );
        assert_eq!(
            emit(|t| t.pointer(300, 9).unwrap()),
            vec![0x02, 0x00, 0xa7, 0xf6]
        );
    }

    #[test]
    fn test_big_pointer_extended_length() {
        assert_eq!(
            emit(|t| t.pointer(8192, 10).unwrap()),
            vec![0x02, 0x00, 0x00, 0x00, 0x08]
        );
        assert_eq!(
            emit(|t| t.pointer(1, 257).unwrap()),
            vec![0x02, 0x00, 0xf8, 0xff, 0xff]
        );
    }

    #[test]
    fn test_end_marker() {
        assert_eq!(emit(|t| t.end()), vec![0x02, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_rejected_pointers_emit_nothing() {
        for (offset, length) in [(0, 3), (8193, 3), (1, 1), (1, 258), (300, 2)] {
            let out = emit(|t| {
                assert_eq!(
                    t.pointer(offset, length),
                    Err(Error::InvalidBackReference),
                    "offset={} length={}",
                    offset,
                    length
                );
                t.literal(b'z');
            });
            assert_eq!(out, vec![0x01, 0x00, b'z']);
        }
    }

    #[test]
    fn test_max_encoded_len_bounds_incompressible() {
        let data: Vec<u8> = (0..5000u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let compressed = encode(&data).unwrap();
        assert!(compressed.len() <= max_encoded_len(data.len()).unwrap());
        assert_eq!(
            max_encoded_len(MAX_DECOMPRESSED_SIZE + 1),
            Err(Error::InputTooLarge)
        );
    }
}
