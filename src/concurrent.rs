// Copyright 2024 Karpeles Lab Inc.
// Batch compression of independent files using Rayon

use rayon::prelude::*;

use crate::decode::decode;
use crate::encode::encode;
use crate::error::Result;

/// Compress several independent files in parallel.
///
/// Each file gets its own encoder, so the output for every input is exactly
/// what [`encode`] would produce. Results are returned in input order.
///
/// # Example
///
/// ```ignore
/// let files: Vec<Vec<u8>> = vec![b"first".to_vec(), b"second".to_vec()];
/// let compressed = hsq::encode_all(&files);
/// ```
pub fn encode_all<T: AsRef<[u8]> + Sync>(inputs: &[T]) -> Vec<Result<Vec<u8>>> {
    inputs.par_iter().map(|data| encode(data.as_ref())).collect()
}

/// Decompress several independent HSQ files in parallel.
pub fn decode_all<T: AsRef<[u8]> + Sync>(inputs: &[T]) -> Vec<Result<Vec<u8>>> {
    inputs.par_iter().map(|data| decode(data.as_ref())).collect()
}
