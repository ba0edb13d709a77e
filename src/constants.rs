// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Size of the file header
pub const HEADER_SIZE: usize = 6;

/// Header bytes must sum to this value (mod 256)
pub const HEADER_CHECKSUM: u8 = 0xab;

/// Largest decompressed size the 24-bit header field can hold
pub const MAX_DECOMPRESSED_SIZE: usize = (1 << 24) - 1;

/// Largest compressed size (header included) the 16-bit header field can hold
pub const MAX_COMPRESSED_SIZE: usize = 0xffff;

/// Back-reference span of the one-byte pointer form
pub const WINDOW_SMALL: usize = 0x100;

/// Back-reference span of the two-byte pointer form
pub const WINDOW_BIG: usize = 0x2000;

/// Input read unit of the chunked encoder
pub const FILE_CHUNK: usize = 0x6000;

/// Shortest and longest runs a pointer can carry
pub const MIN_MATCH: usize = 2;
pub const MAX_MATCH: usize = 257;

/// Longest run the small-window pointer can carry
pub const MAX_SMALL_MATCH: usize = 5;

/// Longest run whose length fits in the big-window word
pub const MAX_INLINE_MATCH: usize = 9;

/// Flag bits per flag word
pub const FLAG_BITS: u8 = 16;

/// Raw bytes a single flag group may own
pub const MAX_PENDING_RAW: usize = 32;
