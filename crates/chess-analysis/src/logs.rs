//! Human-readable log streams produced by a batch run.
//!
//! Analysis code writes through the [`LogSink`] trait, so the same driver
//! can target files on disk ([`FileLogs`]) or memory ([`MemoryLogs`]).

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::quality::MoveTier;

/// Errors raised by file-backed log streams.
#[derive(Error, Debug)]
pub enum LogError {
    /// A log file could not be opened, truncated or written.
    #[error("Log I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A stream was written after a failed reset left it closed.
    #[error("Log stream {path} is not open")]
    NotOpen { path: PathBuf },
}

/// The append-only text streams of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStream {
    MissedWins,
    Blunders,
    Mistakes,
    Inaccuracies,
    AllMoves,
    Acpl,
    Accuracy,
}

impl LogStream {
    /// Every stream, in file order.
    pub const ALL: [LogStream; 7] = [
        LogStream::MissedWins,
        LogStream::Blunders,
        LogStream::Mistakes,
        LogStream::Inaccuracies,
        LogStream::AllMoves,
        LogStream::Acpl,
        LogStream::Accuracy,
    ];

    /// File name of the stream inside the log directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            LogStream::MissedWins => "missed_wins.txt",
            LogStream::Blunders => "blunders.txt",
            LogStream::Mistakes => "mistakes.txt",
            LogStream::Inaccuracies => "inaccuracies.txt",
            LogStream::AllMoves => "moves_log.txt",
            LogStream::Acpl => "ACPL.txt",
            LogStream::Accuracy => "accuracy.txt",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl From<MoveTier> for LogStream {
    fn from(tier: MoveTier) -> Self {
        match tier {
            MoveTier::MissedWin => LogStream::MissedWins,
            MoveTier::Blunder => LogStream::Blunders,
            MoveTier::Mistake => LogStream::Mistakes,
            MoveTier::Inaccuracy => LogStream::Inaccuracies,
        }
    }
}

/// Destination for log lines.
pub trait LogSink {
    /// Discards everything written so far.
    fn reset(&mut self) -> Result<(), LogError>;

    /// Appends one line to a stream.
    fn append(&mut self, stream: LogStream, line: &str) -> Result<(), LogError>;

    /// Pushes buffered lines to their destination.
    fn flush(&mut self) -> Result<(), LogError>;
}

/// Log streams backed by one text file each.
///
/// Files are truncated when the sink is opened and flushed when it is
/// dropped.
pub struct FileLogs {
    dir: PathBuf,
    writers: Vec<BufWriter<File>>,
}

impl FileLogs {
    /// Creates the log directory if needed and opens every stream empty.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LogError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| LogError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut logs = Self {
            dir,
            writers: Vec::with_capacity(LogStream::ALL.len()),
        };
        logs.reset()?;
        Ok(logs)
    }

    /// Directory holding the log files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a stream's file.
    pub fn path(&self, stream: LogStream) -> PathBuf {
        self.dir.join(stream.file_name())
    }

    fn io_error(&self, stream: LogStream, source: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path(stream),
            source,
        }
    }
}

impl LogSink for FileLogs {
    fn reset(&mut self) -> Result<(), LogError> {
        self.writers.clear();
        let mut writers = Vec::with_capacity(LogStream::ALL.len());
        for stream in LogStream::ALL {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(self.path(stream))
                .map_err(|e| self.io_error(stream, e))?;
            writers.push(BufWriter::new(file));
        }
        self.writers = writers;
        Ok(())
    }

    fn append(&mut self, stream: LogStream, line: &str) -> Result<(), LogError> {
        let path = self.path(stream);
        let Some(writer) = self.writers.get_mut(stream.index()) else {
            return Err(LogError::NotOpen { path });
        };
        writeln!(writer, "{}", line).map_err(|source| LogError::Io { path, source })
    }

    fn flush(&mut self) -> Result<(), LogError> {
        for stream in LogStream::ALL {
            let path = self.path(stream);
            let Some(writer) = self.writers.get_mut(stream.index()) else {
                return Err(LogError::NotOpen { path });
            };
            writer
                .flush()
                .map_err(|source| LogError::Io { path, source })?;
        }
        Ok(())
    }
}

/// Log streams kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogs {
    lines: [Vec<String>; 7],
}

impl MemoryLogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written to a stream so far.
    pub fn lines(&self, stream: LogStream) -> &[String] {
        &self.lines[stream.index()]
    }
}

impl LogSink for MemoryLogs {
    fn reset(&mut self) -> Result<(), LogError> {
        for lines in &mut self.lines {
            lines.clear();
        }
        Ok(())
    }

    fn append(&mut self, stream: LogStream, line: &str) -> Result<(), LogError> {
        self.lines[stream.index()].push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        Ok(())
    }
}
