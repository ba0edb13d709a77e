// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Find the most recent earlier occurrence of `buf[begin..end]`.
///
/// Candidates start in `[max(history_start, begin - max_offset), begin)` and
/// may run into the candidate itself. The scan goes backwards from `begin`,
/// so the smallest offset wins. Returns the start position of the match.
pub fn find_match(
    buf: &[u8],
    history_start: usize,
    begin: usize,
    end: usize,
    max_offset: usize,
) -> Option<usize> {
    let needle = &buf[begin..end];
    let first = *needle.first()?;
    let lower = history_start.max(begin.saturating_sub(max_offset));

    (lower..begin)
        .rev()
        .find(|&i| buf[i] == first && buf[i..i + needle.len()] == *needle)
}
