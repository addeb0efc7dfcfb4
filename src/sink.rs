//! Output sinks for prepared chunks.
//!
//! [`JsonlSink`] writes one JSON object per line:
//!
//! ```text
//! {"text":"...","metadata":{"source_id":"a.txt","chunk_index":0},"chunk_id":"a.txt_chunk_0"}
//! ```
//!
//! Non-ASCII text is written as UTF-8, not `\u` escapes. Output goes to a
//! temporary file next to the destination and is renamed into place by
//! [`Sink::finish`]; a sink dropped before that leaves nothing behind.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Chunk, Result};

/// Destination for chunks.
pub trait Sink {
    /// Accept one chunk.
    ///
    /// # Errors
    ///
    /// I/O or serialization failures.
    fn write(&mut self, chunk: &Chunk) -> Result<()>;

    /// Flush and commit everything written so far.
    ///
    /// # Errors
    ///
    /// I/O failures while committing.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Newline-delimited JSON file sink with atomic replacement.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    writer: Option<BufWriter<NamedTempFile>>,
    written: usize,
}

impl JsonlSink {
    /// Start writing to `path`.
    ///
    /// Nothing appears at `path` until [`Sink::finish`] succeeds.
    ///
    /// # Errors
    ///
    /// Fails if a temporary file cannot be created in the destination directory.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".ragprep-").suffix(".jsonl.tmp");
        // Same mode as a plainly created file; the umask still applies.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let tmp = builder.tempfile_in(dir)?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(tmp)),
            written: 0,
        })
    }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Chunks written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }
}

impl Sink for JsonlSink {
    fn write(&mut self, chunk: &Chunk) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("sink already finished"))?;
        serde_json::to_writer(&mut *writer, chunk)?;
        writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        let tmp = writer.into_inner().map_err(|e| e.into_error())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        tracing::info!(path = %self.path.display(), chunks = self.written, "wrote jsonl");
        Ok(())
    }
}

/// Collects chunks in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    chunks: Vec<Chunk>,
}

impl VecSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks collected so far.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Take the collected chunks.
    #[must_use]
    pub fn into_inner(self) -> Vec<Chunk> {
        self.chunks
    }
}

impl Sink for VecSink {
    fn write(&mut self, chunk: &Chunk) -> Result<()> {
        self.chunks.push(chunk.clone());
        Ok(())
    }
}

/// Write chunks to a JSONL file, returning how many were written.
///
/// # Errors
///
/// I/O or serialization failures; the destination is left untouched.
pub fn write_jsonl<I>(chunks: I, path: impl AsRef<Path>) -> Result<usize>
where
    I: IntoIterator<Item = Chunk>,
{
    let mut sink = JsonlSink::create(path)?;
    for chunk in chunks {
        sink.write(&chunk)?;
    }
    sink.finish()?;
    Ok(sink.written())
}
