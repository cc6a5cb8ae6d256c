//! An indenting byte sink for the output pass.

use std::io;

/// The number of spaces in one indent level.
pub const INDENT_WIDTH: usize = 4;

/// A writer which prefixes every line with the current indent.
///
/// The indent is emitted lazily, only once a byte actually follows a newline,
/// so a trailing newline at the end of the output is never followed by indent
/// whitespace.
pub struct IndentedWriter<W> {
    /// The underlying byte sink.
    sink: W,
    /// One indent level.
    chunk: String,
    /// The indent for the current level.
    indent: String,
    /// The current indent level.
    level: usize,
    /// If true, an indent is owed before the next byte.
    pending: bool,
    /// The number of newlines at the end of the output so far.
    newlines: usize,
}

impl<W: io::Write> IndentedWriter<W> {
    /// Creates a new writer indenting by `width` spaces per level.
    pub fn new(width: usize, sink: W) -> Self {
        Self {
            sink,
            chunk: " ".repeat(width),
            indent: String::new(),
            level: 0,
            pending: false,
            newlines: 0,
        }
    }

    /// The number of consecutive newlines at the current end of the output.
    pub fn newline_count(&self) -> usize {
        self.newlines
    }

    /// Raises the indent level by one chunk.
    pub fn increase(&mut self) {
        self.level += 1;
        self.indent = self.chunk.repeat(self.level);
    }

    /// Lowers the indent level by one chunk.
    ///
    /// Callers must balance this against a prior [`increase`](Self::increase);
    /// the level is not allowed to go negative.
    pub fn decrease(&mut self) {
        self.level -= 1;
        self.indent = self.chunk.repeat(self.level);
    }

    /// Writes text to the sink, indenting each new line.
    pub fn write_str(&mut self, data: &str) -> io::Result<()> {
        for b in data.bytes() {
            if self.pending {
                self.pending = false;
                self.sink.write_all(self.indent.as_bytes())?;
            }
            if b == b'\n' {
                self.newlines += 1;
                self.pending = true;
            } else {
                self.newlines = 0;
            }
            self.sink.write_all(&[b])?;
        }
        Ok(())
    }

    /// Consumes the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}
