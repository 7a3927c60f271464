//! Local file formats used by the pipeline.
//!
//! - Output files: newline-delimited bulk action/document pairs, named
//!   `<prefix>-YYMMDD-HHMMSS.txt` so successive runs never overwrite.
//! - Target lists: one decimal user id per line.

use chrono::{DateTime, Local};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;

/// Extension of files the upload mode picks up.
pub const BULK_FILE_EXTENSION: &str = "txt";

/// Attempts at a unique name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Output path for a run started at `now`: `<prefix>-YYMMDD-HHMMSS.txt`.
pub fn stamped_path(prefix: &Path, now: DateTime<Local>) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(now.format("-%y%m%d-%H%M%S").to_string());
    name.push(".");
    name.push(BULK_FILE_EXTENSION);
    PathBuf::from(name)
}

fn with_suffix(path: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return path.to_path_buf();
    }
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!("{}-{}.{}", stem, attempt, BULK_FILE_EXTENSION))
}

/// Write bulk lines to a new file stamped with the current local time.
///
/// Never overwrites: if the stamped name exists a numeric suffix is added.
#[instrument(skip(lines), fields(line_count = lines.len()))]
pub async fn write_bulk_file(prefix: &Path, lines: &[Value]) -> Result<PathBuf, PipelineError> {
    let mut body = String::new();
    for line in lines {
        body.push_str(&serde_json::to_string(line)?);
        body.push('\n');
    }

    let base = stamped_path(prefix, Local::now());
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = with_suffix(&base, attempt);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };

        file.write_all(body.as_bytes()).await?;
        file.flush().await?;

        info!(path = %path.display(), "Wrote output file");
        return Ok(path);
    }

    Err(PipelineError::config(format!(
        "no free output name for {}",
        base.display()
    )))
}

/// Read back a bulk file written by [`write_bulk_file`].
pub async fn read_bulk_file(path: &Path) -> Result<Vec<Value>, PipelineError> {
    let contents = tokio::fs::read_to_string(path).await?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| {
                PipelineError::parse(format!("{} line {}: {}", path.display(), n + 1, e))
            })
        })
        .collect()
}

/// Bulk files in `dir`, sorted by name. Other entries are skipped.
pub async fn list_bulk_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_bulk = path.extension().map_or(false, |ext| ext == BULK_FILE_EXTENSION);
        if is_bulk && entry.file_type().await?.is_file() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-bulk file");
        }
    }

    files.sort();
    Ok(files)
}

/// Read a target list: one decimal user id per line, blank lines ignored.
pub async fn read_target_list(path: &Path) -> Result<Vec<u64>, PipelineError> {
    let contents = tokio::fs::read_to_string(path).await?;
    parse_target_list(&contents)
}

fn parse_target_list(contents: &str) -> Result<Vec<u64>, PipelineError> {
    contents
        .lines()
        .enumerate()
        .map(|(n, line)| (n, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(n, line)| {
            line.parse::<u64>().map_err(|_| {
                PipelineError::parse(format!("line {}: `{}` is not a numeric user id", n + 1, line))
            })
        })
        .collect()
}
