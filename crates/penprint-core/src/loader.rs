use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

use crate::models::LoadStatus;

/// Worst-case UTF-8 width, used to bound the bytes read for a character budget.
const MAX_UTF8_WIDTH: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub path: PathBuf,
    pub text: String,
    pub status: LoadStatus,
}

impl LoadedText {
    fn degraded(path: &Path, status: LoadStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            text: String::new(),
            status,
        }
    }

    /// Human readable description of a degraded load.
    pub fn diagnostic(&self) -> Option<String> {
        match &self.status {
            LoadStatus::Loaded => None,
            LoadStatus::Missing => Some(format!("file not found: {}", self.path.display())),
            LoadStatus::Unreadable { reason } => Some(format!(
                "error reading file {}: {reason}",
                self.path.display()
            )),
        }
    }
}

/// Reads at most `char_limit` characters of UTF-8 text from the start of
/// `path`.
///
/// Missing or unreadable files never fail the caller: they yield an empty
/// text with a degraded [`LoadStatus`] and a warning in the log.
pub async fn load_text(path: &Path, char_limit: usize) -> LoadedText {
    let loaded = match read_prefix(path, char_limit).await {
        Ok(text) => LoadedText {
            path: path.to_path_buf(),
            text,
            status: LoadStatus::Loaded,
        },
        Err(status) => LoadedText::degraded(path, status),
    };

    match loaded.diagnostic() {
        Some(message) => tracing::warn!("{message}"),
        None => tracing::debug!(
            path = %path.display(),
            bytes = loaded.text.len(),
            "text loaded"
        ),
    }
    loaded
}

async fn read_prefix(path: &Path, char_limit: usize) -> Result<String, LoadStatus> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(LoadStatus::Missing),
        Err(err) => {
            return Err(LoadStatus::Unreadable {
                reason: err.to_string(),
            });
        }
    };

    let byte_budget = (char_limit as u64).saturating_mul(MAX_UTF8_WIDTH);
    let mut buf = Vec::new();
    file.take(byte_budget)
        .read_to_end(&mut buf)
        .await
        .map_err(|err| LoadStatus::Unreadable {
            reason: err.to_string(),
        })?;

    decode_prefix(buf, char_limit)
}

/// Decodes the first `char_limit` characters of `buf`. Invalid bytes past
/// the budget are ignored, as is a multi-byte sequence cut by the read.
fn decode_prefix(mut buf: Vec<u8>, char_limit: usize) -> Result<String, LoadStatus> {
    if let Err(err) = std::str::from_utf8(&buf) {
        let valid_up_to = err.valid_up_to();
        let valid_chars =
            std::str::from_utf8(&buf[..valid_up_to]).map_or(0, |valid| valid.chars().count());
        if err.error_len().is_some() && valid_chars < char_limit {
            return Err(LoadStatus::Unreadable {
                reason: format!("invalid UTF-8 at byte {valid_up_to}"),
            });
        }
        buf.truncate(valid_up_to);
    }

    let text = String::from_utf8(buf).map_err(|err| LoadStatus::Unreadable {
        reason: err.to_string(),
    })?;
    Ok(truncate_chars(text, char_limit))
}

fn truncate_chars(mut text: String, char_limit: usize) -> String {
    if let Some((offset, _)) = text.char_indices().nth(char_limit) {
        text.truncate(offset);
    }
    text
}
