// Copyright 2024 Karpeles Lab Inc.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! `std::io::Write` adapter for HSQ compression

use std::io::{self, Write};

use crate::encode::Encoder;

/// Writer compresses everything written to it into one HSQ file
///
/// The header can only be produced once the input is complete, so the file
/// is written to the underlying writer by [`Writer::finish`], or on drop if
/// `finish` was never called.
///
/// # Example
///
/// ```
/// use hsq::{decode, Writer};
/// use std::io::Write;
///
/// let mut compressed = Vec::new();
/// {
///     let mut writer = Writer::new(&mut compressed);
///     writer.write_all(b"Hello, World!").unwrap();
///     writer.finish().unwrap();
/// }
///
/// assert_eq!(decode(&compressed).unwrap(), b"Hello, World!");
/// ```
pub struct Writer<W: Write> {
    writer: W,
    encoder: Option<Encoder>,
}

impl<W: Write> Writer<W> {
    pub fn new(writer: W) -> Self {
        Writer {
            writer,
            encoder: Some(Encoder::new()),
        }
    }

    /// Terminate the file and write it out. Later calls do nothing.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(encoder) = self.encoder.take() {
            let compressed = encoder.finish()?;
            self.writer.write_all(&compressed)?;
        }
        self.writer.flush()
    }

    /// Get a reference to the underlying writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let encoder = self.encoder.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "hsq: write after finish")
        })?;
        encoder.write(buf)?;
        Ok(buf.len())
    }

    /// Only flushes the underlying writer; compressed data is held back
    /// until `finish`.
    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        // Errors cannot be reported from drop
        let _ = self.finish();
    }
}
