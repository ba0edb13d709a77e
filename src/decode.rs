// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::bits::FlagReader;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::header::Header;

/// One unit of the compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A single byte copied to the output
    Literal(u8),
    /// Back-reference within the last 256 bytes, 2 to 5 bytes long
    Short { offset: usize, length: usize },
    /// Back-reference within the last 8192 bytes, 2 to 257 bytes long
    Long { offset: usize, length: usize },
    /// End of compressed data
    End,
}

/// Pulls tokens off the flag/raw interleaved stream
struct TokenReader<'a> {
    flags: FlagReader<'a>,
}

impl<'a> TokenReader<'a> {
    fn new(src: &'a [u8]) -> Self {
        TokenReader {
            flags: FlagReader::new(src),
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        if self.flags.bit()? {
            return Ok(Token::Literal(self.flags.byte()?));
        }

        if !self.flags.bit()? {
            let hi = self.flags.bit()? as usize;
            let lo = self.flags.bit()? as usize;
            let raw = self.flags.byte()? as usize;
            return Ok(Token::Short {
                offset: WINDOW_SMALL - raw,
                length: MIN_MATCH + (hi << 1 | lo),
            });
        }

        let word = self.flags.word()? as usize;
        let length = match word & 7 {
            0 => {
                let extra = self.flags.byte()?;
                if word == 0 && extra == 0 {
                    return Ok(Token::End);
                }
                MIN_MATCH + extra as usize
            }
            code => MIN_MATCH + code,
        };

        Ok(Token::Long {
            offset: WINDOW_BIG - (word >> 3),
            length,
        })
    }
}

/// Decode returns the original data of an HSQ file.
///
/// The header checksum is verified before any token is read. Bytes past the
/// compressed size recorded in the header are ignored.
pub fn decode(src: &[u8]) -> Result<Vec<u8>> {
    let header = Header::parse(src)?;
    let expected = header.decompressed_len();
    let body = body(src, &header)?;

    // A body byte yields at most one full-length match
    let mut dst = Vec::with_capacity(expected.min(body.len() * MAX_MATCH));
    let mut tokens = TokenReader::new(body);

    loop {
        match tokens.next_token()? {
            Token::Literal(b) => {
                check_room(&dst, 1, expected)?;
                dst.push(b);
            }
            Token::Short { offset, length } | Token::Long { offset, length } => {
                check_room(&dst, length, expected)?;
                copy_match(&mut dst, offset, length)?;
            }
            Token::End => break,
        }
    }

    // The end marker arrived before the declared size was produced
    if dst.len() != expected {
        return Err(Error::TruncatedStream);
    }

    Ok(dst)
}

/// Returns the decompressed length recorded in the header of src.
pub fn decode_len(src: &[u8]) -> Result<usize> {
    Header::parse(src).map(|h| h.decompressed_len())
}

/// List the tokens of an HSQ file up to and including the end marker,
/// without producing any output.
pub fn tokenize(src: &[u8]) -> Result<Vec<Token>> {
    let header = Header::parse(src)?;
    let mut tokens = TokenReader::new(body(src, &header)?);
    let mut list = Vec::new();

    loop {
        let token = tokens.next_token()?;
        list.push(token);
        if token == Token::End {
            return Ok(list);
        }
    }
}

fn body<'a>(src: &'a [u8], header: &Header) -> Result<&'a [u8]> {
    src.get(HEADER_SIZE..header.compressed_len())
        .ok_or(Error::TruncatedStream)
}

/// Tokens may not write past the size declared in the header
fn check_room(dst: &[u8], n: usize, expected: usize) -> Result<()> {
    if n > expected - dst.len() {
        return Err(Error::TruncatedStream);
    }
    Ok(())
}

/// Copy `length` bytes from `offset` back; the source may overlap the bytes
/// being produced.
fn copy_match(dst: &mut Vec<u8>, offset: usize, length: usize) -> Result<()> {
    if offset == 0 || offset > dst.len() {
        return Err(Error::InvalidBackReference);
    }

    let start = dst.len() - offset;
    for i in start..start + length {
        let b = dst[i];
        dst.push(b);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(decompressed_len: usize, body: &[u8]) -> Vec<u8> {
        let header = Header::new(decompressed_len, HEADER_SIZE + body.len()).unwrap();
        let mut src = header.to_bytes().to_vec();
        src.extend_from_slice(body);
        src
    }

    #[test]
    fn test_decode_literal() {
        let src = with_header(1, &[0x05, 0x00, 0x41, 0x00, 0x00, 0x00]);
        assert_eq!(decode(&src).unwrap(), b"A");
        assert_eq!(decode_len(&src).unwrap(), 1);
    }

    #[test]
    fn test_overlapping_copy() {
        // Literal 'x', then Long { offset: 1, length: 10 }, then the end marker
        // Flags: 1, 0,1, 0,1 -> 0b10101
        let src = with_header(
            11,
            &[0x15, 0x00, b'x', 0xf8, 0xff, 0x08, 0x00, 0x00, 0x00],
        );
        assert_eq!(decode(&src).unwrap(), vec![b'x'; 11]);
    }

    #[test]
    fn test_short_offset_256() {
        let mut data: Vec<u8> = (0..=255).collect();
        data.extend_from_slice(&[0, 1]);

        // 256 literals fill sixteen flag words; then Short { offset: 256, length: 2 }
        let mut body = Vec::new();
        for group in data[..256].chunks(16) {
            body.extend_from_slice(&[0xff, 0xff]);
            body.extend_from_slice(group);
        }
        // Flags: 0,0,0,0 (short, length 2), 0,1 (end marker)
        body.extend_from_slice(&[0x20, 0x00, 0x00, 0x00, 0x00, 0x00]);

        let src = with_header(data.len(), &body);
        assert_eq!(decode(&src).unwrap(), data);
    }

    #[test]
    fn test_reference_before_start() {
        // Short { offset: 1, length: 2 } with nothing decoded yet
        let src = with_header(2, &[0x00, 0x00, 0xff]);
        assert_eq!(decode(&src), Err(Error::InvalidBackReference));
    }

    #[test]
    fn test_missing_end_marker() {
        let src = with_header(1, &[0x01, 0x00, 0x41]);
        assert_eq!(decode(&src), Err(Error::TruncatedStream));
    }

    #[test]
    fn test_body_shorter_than_header_claims() {
        let mut src = with_header(1, &[0x05, 0x00, 0x41, 0x00, 0x00, 0x00]);
        src.pop();
        assert_eq!(decode(&src), Err(Error::TruncatedStream));
    }

    #[test]
    fn test_output_disagrees_with_header() {
        let body = [0x05, 0x00, 0x41, 0x00, 0x00, 0x00];
        assert_eq!(decode(&with_header(2, &body)), Err(Error::TruncatedStream));
        assert_eq!(decode(&with_header(0, &body)), Err(Error::TruncatedStream));
    }

    /// Re-stamp a header with a new decompressed size and a valid checksum
    fn claim_len(src: &[u8], decompressed_len: usize) -> Vec<u8> {
        let header = Header::parse(src).unwrap();
        let forged = Header::new(decompressed_len, header.compressed_len()).unwrap();
        let mut out = src.to_vec();
        out[..HEADER_SIZE].copy_from_slice(&forged.to_bytes());
        out
    }

    #[test]
    fn test_declared_size_overrun_and_underrun() {
        // Literal, Short { offset: 1, length: 2 }, literal: four bytes
        let src = crate::encode(b"AAAA").unwrap();
        assert_eq!(decode(&claim_len(&src, 3)), Err(Error::TruncatedStream));
        assert_eq!(decode(&claim_len(&src, 9)), Err(Error::TruncatedStream));
        assert_eq!(decode(&claim_len(&src, 4)).unwrap(), b"AAAA");
    }

    #[test]
    fn test_forged_size_on_empty_body() {
        // Largest legal size, but the body is only the end marker
        let src = with_header(MAX_DECOMPRESSED_SIZE, &[0x02, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(decode(&src), Err(Error::TruncatedStream));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut src = with_header(1, &[0x05, 0x00, 0x41, 0x00, 0x00, 0x00]);
        src.extend_from_slice(b"garbage");
        assert_eq!(decode(&src).unwrap(), b"A");
    }

    #[test]
    fn test_tokenize() {
        let src = with_header(
            11,
            &[0x15, 0x00, b'x', 0xf8, 0xff, 0x08, 0x00, 0x00, 0x00],
        );
        assert_eq!(
            tokenize(&src).unwrap(),
            vec![
                Token::Literal(b'x'),
                Token::Long {
                    offset: 1,
                    length: 10
                },
                Token::End
            ]
        );
    }
}
