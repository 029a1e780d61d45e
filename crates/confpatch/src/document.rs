//! Line store - a config file held in memory as ordered lines

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// An ordered sequence of text lines representing one configuration file.
///
/// Lines keep their exact bytes; the only normalization is splitting on line
/// boundaries. A line that is not valid UTF-8 is matched against its lossy
/// decoding but written back byte for byte unless an edit changes it. Line
/// order only changes through planned edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    lines: Vec<String>,
    // Original bytes of lines that were not valid UTF-8; same length as `lines`.
    raw: Vec<Option<Vec<u8>>>,
}

/// Split on `\n`, dropping one trailing `\r` per line, like `str::lines`.
fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let mut pieces = body.split(|b| *b == b'\n');
    if bytes.is_empty() {
        pieces.next();
    }
    pieces.map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

impl ConfigDocument {
    /// Create a document from lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let raw = vec![None; lines.len()];
        Self { lines, raw }
    }

    /// Parse a document from file content
    pub fn parse(content: &str) -> Self {
        Self::from_lines(content.lines())
    }

    /// Parse a document from raw file bytes, keeping non-UTF-8 lines intact
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut doc = Self::default();
        for line in split_lines(bytes) {
            match std::str::from_utf8(line) {
                Ok(text) => {
                    doc.lines.push(text.to_string());
                    doc.raw.push(None);
                }
                Err(_) => {
                    doc.lines.push(String::from_utf8_lossy(line).into_owned());
                    doc.raw.push(Some(line.to_vec()));
                }
            }
        }
        doc
    }

    /// Read a file fully into memory.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::io("Reading config", path, e))?;
        let doc = Self::from_bytes(&bytes);
        log::debug!("Loaded {} lines from {}", doc.len(), path.display());
        Ok(doc)
    }

    /// Truncate `path` and write every line followed by a single newline.
    ///
    /// The full content is rendered before the file is opened, so a failure
    /// while building it never leaves a truncated file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_bytes();
        fs::write(path, content).map_err(|e| Error::io("Writing config", path, e))?;
        log::debug!("Wrote {} lines to {}", self.len(), path.display());
        Ok(())
    }

    /// Render the document as text, non-UTF-8 bytes shown lossily
    pub fn render(&self) -> String {
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Render the document as the exact bytes [`save`](Self::save) writes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for (line, raw) in self.lines.iter().zip(&self.raw) {
            match raw {
                Some(bytes) => out.extend_from_slice(bytes),
                None => out.extend_from_slice(line.as_bytes()),
            }
            out.push(b'\n');
        }
        out
    }

    /// All lines in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the document has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one line after the last line
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.raw.push(None);
    }

    /// Insert lines before the first line
    pub(crate) fn prepend(&mut self, lines: &[String]) {
        self.lines.splice(0..0, lines.iter().cloned());
        self.raw.splice(0..0, lines.iter().map(|_| None));
    }

    /// Insert lines after the last line
    pub(crate) fn append(&mut self, lines: &[String]) {
        for line in lines {
            self.push(line.clone());
        }
    }

    /// Replace a single line in place.
    ///
    /// When the new text is the old one minus an ASCII prefix (an uncommented
    /// line), the same prefix is cut from the original bytes so the rest of
    /// the line survives unchanged.
    pub(crate) fn replace(&mut self, index: usize, line: String) {
        let (Some(slot), Some(raw)) = (self.lines.get_mut(index), self.raw.get_mut(index)) else {
            return;
        };
        *raw = raw.take().and_then(|bytes| {
            let prefix = slot.strip_suffix(line.as_str())?;
            let rest = bytes.strip_prefix(prefix.as_bytes())?;
            prefix.is_ascii().then(|| rest.to_vec())
        });
        *slot = line;
    }

    /// Keep only the lines matching `keep`, returning the removed ones
    pub fn retain_lines<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut removed = Vec::new();
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut raw = Vec::with_capacity(self.raw.len());
        for (line, bytes) in self.lines.drain(..).zip(self.raw.drain(..)) {
            if keep(&line) {
                lines.push(line);
                raw.push(bytes);
            } else {
                removed.push(line);
            }
        }
        self.lines = lines;
        self.raw = raw;
        removed
    }
}
