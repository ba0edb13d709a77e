// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! `std::io::Read` adapter for HSQ decompression

use std::io::{self, Read};

use crate::constants::*;
use crate::decode::decode;
use crate::error::Error;
use crate::header::Header;

/// Reader decompresses one HSQ file from an underlying reader
///
/// The header is read first; it tells how many more bytes belong to the
/// file. Nothing past the file is consumed from the underlying reader.
///
/// # Example
///
/// ```
/// use hsq::{encode, Reader};
/// use std::io::Read;
///
/// let compressed = encode(b"Hello, World!").unwrap();
///
/// let mut reader = Reader::new(&compressed[..]);
/// let mut decompressed = Vec::new();
/// reader.read_to_end(&mut decompressed).unwrap();
///
/// assert_eq!(decompressed, b"Hello, World!");
/// ```
pub struct Reader<R: Read> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    decoded: bool,
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader {
            reader,
            buf: Vec::new(),
            pos: 0,
            decoded: false,
        }
    }

    /// Read the whole file from the underlying reader and decode it
    fn read_file(&mut self) -> io::Result<()> {
        let mut header = [0u8; HEADER_SIZE];
        self.reader.read_exact(&mut header).map_err(truncated)?;

        let parsed = Header::parse(&header)?;

        let mut file = vec![0u8; parsed.compressed_len()];
        file[..HEADER_SIZE].copy_from_slice(&header);
        self.reader
            .read_exact(&mut file[HEADER_SIZE..])
            .map_err(truncated)?;

        self.buf = decode(&file)?;
        self.pos = 0;
        self.decoded = true;
        Ok(())
    }

    /// Get a reference to the underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}

fn truncated(err: io::Error) -> io::Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::TruncatedStream.into()
    } else {
        err
    }
}

impl<R: Read> Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.decoded {
            self.read_file()?;
        }

        let n = buf.len().min(self.buf.len() - self.pos);
        buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;

    #[test]
    fn test_reader_basic() {
        let compressed = encode(b"Hello, World! Hello, World!").unwrap();

        let mut reader = Reader::new(&compressed[..]);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(out, b"Hello, World! Hello, World!");
    }

    #[test]
    fn test_reader_small_reads() {
        let data: Vec<u8> = (0..2000).map(|i| (i % 251) as u8).collect();
        let compressed = encode(&data).unwrap();

        let mut reader = Reader::new(&compressed[..]);
        let mut out = Vec::new();
        let mut buf = [0u8; 7];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        assert_eq!(out, data);
    }

    #[test]
    fn test_reader_stops_at_file_end() {
        let mut stream = encode(b"first").unwrap();
        let first_len = stream.len();
        stream.extend_from_slice(&encode(b"second").unwrap());

        let mut cursor = io::Cursor::new(stream);
        let mut out = Vec::new();
        Reader::new(&mut cursor).read_to_end(&mut out).unwrap();

        assert_eq!(out, b"first");
        assert_eq!(cursor.position() as usize, first_len);
    }

    #[test]
    fn test_reader_truncated() {
        let compressed = encode(b"Hello, World!").unwrap();

        let mut reader = Reader::new(&compressed[..compressed.len() - 1]);
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_reader_corrupt_header() {
        let mut compressed = encode(b"Hello, World!").unwrap();
        compressed[0] ^= 0x40;

        let mut reader = Reader::new(&compressed[..]);
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
