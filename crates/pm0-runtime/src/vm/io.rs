//! Machine streams
//!
//! The engine talks to three byte streams: character output (shared with the
//! trace), character input, and the diagnostics stream. Standard output is
//! always flushed before a diagnostic line is written so the two interleave
//! in program order.

use crate::bytecode::Word;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

/// Streams used by one machine run
pub struct MachineIo {
    /// Trace output and CHO characters
    pub output: Box<dyn Write>,
    /// CHI characters
    pub input: Box<dyn Read>,
    /// One-line diagnostics
    pub diagnostics: Box<dyn Write>,
}

impl MachineIo {
    pub fn new(output: Box<dyn Write>, input: Box<dyn Read>, diagnostics: Box<dyn Write>) -> Self {
        Self {
            output,
            input,
            diagnostics,
        }
    }

    /// Process stdout, stdin and stderr
    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::stdout()),
            Box::new(io::stdin()),
            Box::new(io::stderr()),
        )
    }

    /// Write the low byte of `code` as a character
    pub fn write_char(&mut self, code: Word) -> io::Result<()> {
        self.output.write_all(&[code as u8])
    }

    /// Read one byte, or `-1` at end of input
    pub fn read_char(&mut self) -> io::Result<Word> {
        // Characters typed by the user should follow whatever the program printed.
        self.output.flush()?;

        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(-1),
                Ok(_) => return Ok(Word::from(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Flush output, then write `message` as one diagnostic line
    pub fn diagnostic(&mut self, message: &str) -> io::Result<()> {
        self.output.flush()?;
        writeln!(self.diagnostics, "{}", message)?;
        self.diagnostics.flush()
    }
}

/// Cloneable in-memory sink
///
/// Hand one clone to a [`MachineIo`] and keep another to read what the machine
/// wrote.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
