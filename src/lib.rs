// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! # HSQ Compression
//!
//! This library implements the HSQ format, the LZ77 file codec used for the
//! data files of early-1990s Cryo games. Output is byte-identical to the
//! original packing tool.
//!
//! An HSQ file is:
//! - A 6-byte header (decompressed size, compressed size, checksum)
//! - A stream of literal and back-reference tokens steered by 16-bit flag words
//! - An end-of-stream sentinel
//!
//! ## Example
//!
//! ```rust
//! use hsq::{decode, encode};
//!
//! let data = b"Hello, World! Hello, World! Hello, HSQ!";
//! let compressed = encode(data).expect("compression failed");
//! let decompressed = decode(&compressed).expect("decompression failed");
//! assert_eq!(data, &decompressed[..]);
//! ```

mod bits;
mod constants;
mod decode;
mod encode;
mod error;
mod header;
mod reader;
mod window;
mod writer;

#[cfg(feature = "concurrent")]
mod concurrent;

pub use constants::{FILE_CHUNK, HEADER_SIZE, MAX_COMPRESSED_SIZE, MAX_DECOMPRESSED_SIZE};
pub use decode::{decode, decode_len, tokenize, Token};
pub use encode::{encode, encode_reader, max_encoded_len, Encoder};
pub use error::{Error, Result};
pub use header::Header;
pub use reader::Reader;
pub use writer::Writer;

#[cfg(feature = "concurrent")]
pub use concurrent::{decode_all, encode_all};
