//! Writing packed documents to files and streams

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use packed_structs::{LayoutError, PackOptions, Value, pack_document};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Packs `root` and writes the padded document. Returns the bytes written.
///
/// Nothing is written when packing fails.
pub fn write_document<W: Write>(writer: &mut W, root: &Value, options: &PackOptions) -> Result<usize> {
    let bytes = pack_document(root, options)?;
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Packs `root` into a new file at `path`.
pub fn save_document<P: AsRef<Path>>(path: P, root: &Value, options: &PackOptions) -> Result<usize> {
    // pack first so a layout error leaves no file behind
    let bytes = pack_document(root, options)?;
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    file.write_all(&bytes)?;
    file.flush()?;
    debug!(path = %path.as_ref().display(), len = bytes.len(), "saved document");
    Ok(bytes.len())
}

/// Writes documents back to back, each padded on its own.
pub struct DocumentWriter<W: Write> {
    writer: W,
    options: PackOptions,
    offsets: Vec<usize>,
    written: usize,
}

impl<W: Write> DocumentWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, PackOptions::default())
    }

    pub fn with_options(writer: W, options: PackOptions) -> Self {
        Self {
            writer,
            options,
            offsets: Vec::new(),
            written: 0,
        }
    }

    /// Appends one document and returns its byte offset in the stream.
    pub fn write(&mut self, root: &Value) -> Result<usize> {
        let offset = self.written;
        self.written += write_document(&mut self.writer, root, &self.options)?;
        self.offsets.push(offset);
        Ok(offset)
    }

    /// Byte offset of every document written so far.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
