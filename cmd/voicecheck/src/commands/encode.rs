//! `voicecheck encode`: turn a directory of clips into ready-to-send
//! request bodies.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{debug, info, warn};
use voicecheck_audio::payload;

use crate::Cli;

/// Encode a directory of audio files into a batch request file.
#[derive(Args)]
pub struct EncodeCommand {
    /// Directory containing audio files
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file
    #[arg(short, long, default_value = "batch_requests.json")]
    output: PathBuf,

    /// Language written into every request
    #[arg(long, default_value = "English")]
    language: String,

    /// Audio format; also selects files by extension
    #[arg(long, default_value = "mp3")]
    format: String,
}

/// One entry of the batch file. The shape matches the detection request
/// body, plus the source file name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub file_name: String,
    pub language: String,
    pub audio_format: String,
    pub audio_base64: String,
}

impl EncodeCommand {
    pub fn run(&self, _cli: &Cli) -> Result<()> {
        let requests = build_requests(&self.input, &self.language, &self.format)?;
        if requests.is_empty() {
            warn!(
                "no .{} files found in {}",
                self.format,
                self.input.display()
            );
        }

        let data = serde_json::to_vec_pretty(&requests)?;
        std::fs::write(&self.output, data)
            .with_context(|| format!("write {}", self.output.display()))?;
        info!(
            "encoded {} files into {}",
            requests.len(),
            self.output.display()
        );
        Ok(())
    }
}

/// Encodes every file in `dir` whose extension matches `format`
/// (case-insensitive), ordered by file name.
pub fn build_requests(dir: &Path, language: &str, format: &str) -> Result<Vec<BatchRequest>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(format));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();

    let mut requests = Vec::with_capacity(files.len());
    for path in files {
        let data = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("encoded {} ({} bytes)", file_name, data.len());
        requests.push(BatchRequest {
            file_name,
            language: language.to_string(),
            audio_format: format.to_string(),
            audio_base64: payload::encode(&data),
        });
    }
    Ok(requests)
}
