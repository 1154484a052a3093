//! Line producer over a named file.
//!
//! Progress is the byte offset just past the last line handed out. Lines are
//! read whole, so a captured offset is always on a line boundary; restoring
//! re-opens the file by path and seeks there.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use snapiter_core::config::SnapiterConfig;
use snapiter_core::{Error, InputKind, IntoProducer, Producer, Result, Resumable};

/// Default read buffer, matching `SnapiterConfig::default().line_buffer_bytes`.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// How the file is (re-)opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    fn open(self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(self == AccessMode::ReadWrite)
            .open(path)
    }
}

/// An open file together with the name it can be re-opened by.
#[derive(Debug)]
pub struct NamedFile {
    path: PathBuf,
    file: File,
    mode: AccessMode,
    offset: u64,
    capacity: usize,
}

impl NamedFile {
    /// Open `path` read-only from the start.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with(path, AccessMode::ReadOnly)
    }

    pub fn open_with(path: impl AsRef<Path>, mode: AccessMode) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = mode.open(&path)?;
        Ok(Self {
            path,
            file,
            mode,
            offset: 0,
            capacity: DEFAULT_BUFFER_CAPACITY,
        })
    }

    /// Adopt an already open file. Reading starts at its current position.
    pub fn from_parts(path: impl Into<PathBuf>, mut file: File, mode: AccessMode) -> io::Result<Self> {
        let offset = file.stream_position()?;
        Ok(Self {
            path: path.into(),
            file,
            mode,
            offset,
            capacity: DEFAULT_BUFFER_CAPACITY,
        })
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Apply `line_buffer_bytes` from configuration.
    pub fn configured(self, cfg: &SnapiterConfig) -> Self {
        self.with_buffer_capacity(cfg.line_buffer_bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Yields the file's lines, terminator included.
#[derive(Debug)]
pub struct LineProducer {
    reader: BufReader<File>,
    path: PathBuf,
    mode: AccessMode,
    offset: u64,
    capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub path: PathBuf,
    pub offset: u64,
    pub mode: AccessMode,
    pub buffer_capacity: usize,
}

impl LineProducer {
    pub fn new(named: NamedFile) -> Self {
        Self {
            reader: BufReader::with_capacity(named.capacity, named.file),
            path: named.path,
            mode: named.mode,
            offset: named.offset,
            capacity: named.capacity,
        }
    }

    /// Byte offset of the next unread line.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Producer for LineProducer {
    type Item = String;

    fn next(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.offset += n as u64;
        String::from_utf8(buf)
            .map(Some)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

impl Resumable for LineProducer {
    type State = FileState;

    fn capture(&self) -> Result<FileState> {
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %self.path.display(), offset = self.offset, "capturing file position");

        Ok(FileState {
            path: self.path.clone(),
            offset: self.offset,
            mode: self.mode,
            buffer_capacity: self.capacity,
        })
    }

    fn restore(state: FileState) -> Result<Self> {
        let restore_err =
            |what: &str, e: io::Error| Error::Restore(format!("{what} {}: {e}", state.path.display()));

        let mut file = state
            .mode
            .open(&state.path)
            .map_err(|e| restore_err("cannot reopen", e))?;
        let len = file
            .metadata()
            .map_err(|e| restore_err("cannot stat", e))?
            .len();
        if len < state.offset {
            return Err(Error::Restore(format!(
                "{} is {len} bytes, shorter than saved offset {}",
                state.path.display(),
                state.offset
            )));
        }
        file.seek(SeekFrom::Start(state.offset))
            .map_err(|e| restore_err("cannot seek", e))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %state.path.display(), offset = state.offset, "restored file position");

        let capacity = state.buffer_capacity.max(1);
        Ok(Self {
            reader: BufReader::with_capacity(capacity, file),
            path: state.path,
            mode: state.mode,
            offset: state.offset,
            capacity,
        })
    }
}

impl IntoProducer for NamedFile {
    type Item = String;
    type Producer = LineProducer;
    const KIND: InputKind = InputKind::ByteStream;

    fn into_producer(self) -> LineProducer {
        LineProducer::new(self)
    }
}
