use anyhow::{anyhow, Context, Result};
use memmap2::MmapOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether a failed read aborts or is reported in `ReadStats::read_error`
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
    /// Map the file into memory instead of buffered reads
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
            use_mmap: false,
        }
    }
}

/// Statistics for one whole-file read
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub chars_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// Whole-document reader for subtitle and reference files
///
/// Alignment needs random access across the entire reference, so files are read in one piece
/// rather than streamed.
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read a UTF-8 text file
    ///
    /// Without `fail_fast`, open and decoding failures return empty content with the error
    /// recorded in the stats.
    pub async fn read_text_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = Instant::now();

        debug!("Starting read of file: {} (mmap: {})", path.display(), self.config.use_mmap);

        let loaded = if self.config.use_mmap {
            read_mapped(path.to_path_buf()).await
        } else {
            self.read_buffered(path).await
        };

        let (content, bytes_read) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                let error_msg = format!("Failed to read {}: {:#}", path.display(), e);
                warn!("{}", error_msg);

                if self.config.fail_fast {
                    return Err(anyhow!(error_msg));
                }
                let stats = ReadStats {
                    file_path: path.display().to_string(),
                    bytes_read: 0,
                    chars_read: 0,
                    duration_ms: start_time.elapsed().as_millis() as u64,
                    read_error: Some(error_msg),
                };
                return Ok((String::new(), stats));
            }
        };

        let stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read,
            chars_read: content.chars().count() as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        info!(
            "Read {}: {} chars, {} bytes in {}ms ({:.2} MB/s)",
            path.display(),
            stats.chars_read,
            stats.bytes_read,
            stats.duration_ms,
            if stats.duration_ms > 0 {
                (bytes_read as f64 / 1_000_000.0) / (stats.duration_ms as f64 / 1000.0)
            } else {
                0.0
            }
        );

        Ok((content, stats))
    }

    async fn read_buffered(&self, path: &Path) -> Result<(String, u64)> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open file {}", path.display()))?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::new();
        let bytes_read = reader.read_to_end(&mut bytes).await? as u64;
        let content = String::from_utf8(bytes).context("UTF-8 decoding error")?;
        Ok((content, bytes_read))
    }
}

async fn read_mapped(path: PathBuf) -> Result<(String, u64)> {
    tokio::task::spawn_blocking(move || -> Result<(String, u64)> {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open file {}", path.display()))?;
        let len = file.metadata()?.len();
        // zero-length mappings are rejected on some platforms
        if len == 0 {
            return Ok((String::new(), 0));
        }
        // SAFETY: the map is read once and copied out before the file handle is dropped
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        let content = std::str::from_utf8(&mmap).context("UTF-8 decoding error")?;
        Ok((content.to_owned(), len))
    })
    .await?
}
