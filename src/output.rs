// WHY: output naming and writing live outside main so the CLI tests and library callers agree
// on where corrected files land

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// Default path for the corrected file: `<stem>_corrected.srt` next to the input
pub fn generate_output_path(srt_path: &Path) -> PathBuf {
    let mut output = srt_path.to_path_buf();
    let file_stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("subtitles");
    output.set_file_name(format!("{file_stem}_corrected.srt"));
    output
}

/// Write text to `path` through a buffered async writer
pub async fn write_text_file(path: &Path, content: &str) -> Result<()> {
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes()).await?;
    writer.flush().await?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
