//! File-based blacklist loader.
//!
//! Reads a blacklist file with one dotted-decimal IPv4 address per line and
//! compiles it into an [`AddressSet`]. Loading happens exactly once, before
//! the interception point is registered, so the rest of the engine can treat
//! the set as immutable.

use std::io::BufRead;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use super::AddressSet;

/// Error type for blacklist loading operations.
///
/// All variants other than [`LoadError::Parse`] mean the source itself was
/// unavailable; startup must fail without attaching the interception point.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File was not found at the specified path.
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    /// Permission denied when accessing the file.
    #[error("permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// I/O error while reading the file.
    #[error("I/O error reading {path:?}")]
    Io {
        /// Path to the file that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Error parsing the blacklist content.
    #[error("parse error")]
    Parse(#[from] ParseError),

    /// Task join error from spawning a blocking task.
    #[error("task join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Error type for blacklist parsing operations.
///
/// Malformed address lines are not errors: they are skipped with a warning
/// rather than admitted as best-effort values or rejected wholesale.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// I/O error during reading.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Parse blacklist content into an [`AddressSet`].
///
/// Per line: exactly one trailing line terminator is stripped (LF or CRLF),
/// blank lines are skipped, and the remainder must parse as a dotted-decimal
/// IPv4 address. Lines that do not parse are skipped and counted. Once
/// `max_entries` addresses have been accepted no further lines are consumed;
/// a single warning records that the cap truncated the source.
pub fn parse(reader: &mut dyn BufRead, max_entries: usize) -> Result<AddressSet, ParseError> {
    let mut entries: Vec<Ipv4Addr> = Vec::new();
    let mut malformed = 0usize;
    let mut line = String::new();

    loop {
        if entries.len() >= max_entries {
            line.clear();
            if reader.read_line(&mut line)? > 0 {
                warn!(max_entries, "blacklist capacity reached, remaining lines ignored");
            }
            break;
        }

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let entry = line.strip_suffix('\n').unwrap_or(&line);
        let entry = entry.strip_suffix('\r').unwrap_or(entry);

        if entry.is_empty() {
            continue;
        }

        match entry.parse::<Ipv4Addr>() {
            Ok(addr) => {
                info!(address = %addr, "added address to blacklist");
                entries.push(addr);
            }
            Err(_) => {
                malformed += 1;
                warn!(entry, "skipping malformed blacklist entry");
            }
        }
    }

    if malformed > 0 {
        warn!(count = malformed, "blacklist contained malformed entries");
    }

    Ok(AddressSet::new(entries))
}

/// Loads the blacklist from a local file.
pub struct FileLoader;

impl FileLoader {
    /// Load a blacklist from a local file.
    ///
    /// Reads the file asynchronously and parses it in a blocking task so a
    /// large source never stalls the async runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if:
    /// - The file does not exist ([`LoadError::NotFound`])
    /// - Permission is denied ([`LoadError::PermissionDenied`])
    /// - An I/O error occurs ([`LoadError::Io`])
    ///
    /// An empty file (or one with no valid lines) is not an error; it yields
    /// an empty set.
    pub async fn load(path: &Path, max_entries: usize) -> Result<AddressSet, LoadError> {
        let path_buf = path.to_path_buf();

        let mut file = File::open(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path_buf.clone()),
            std::io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(path_buf.clone()),
            _ => LoadError::Io {
                path: path_buf.clone(),
                source: e,
            },
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .await
            .map_err(|e| LoadError::Io {
                path: path_buf.clone(),
                source: e,
            })?;

        let set = tokio::task::spawn_blocking(move || {
            let mut reader = std::io::BufReader::new(content.as_bytes());
            parse(&mut reader, max_entries)
        })
        .await??;

        Ok(set)
    }
}
