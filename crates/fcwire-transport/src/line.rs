use std::io::{BufRead, BufReader, ErrorKind, Read, Write};

use crate::error::{Result, TransportError};

/// Reads newline-delimited lines from any `Read` stream.
///
/// Reads are blocking; the caller gets the next unread line with its
/// terminator stripped, or [`TransportError::Closed`] at EOF.
pub struct LineReader<T> {
    inner: BufReader<T>,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }

    /// Read the next line (blocking), without the trailing `\n` or `\r\n`.
    ///
    /// Returns `Err(TransportError::Closed)` when EOF is reached.
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        loop {
            match self.inner.read_line(&mut line) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        self.inner.get_ref()
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any buffered, unread input is discarded.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// Writes newline-terminated lines to any `Write` stream.
///
/// Every write is flushed immediately: the peer must see a command before
/// the caller blocks on the reply.
pub struct LineWriter<T> {
    inner: T,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Write a single line (text plus `\n`) and flush.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.inner.write_all(text.as_bytes())?;
        self.inner.write_all(b"\n")?;
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
