//! Per-directory narration run: Markdown in, one MP3 per document out.

use crate::audio::{AudioCombiner, collect_chunk_files, combine_folder};
use crate::text::prepare_chunks;
use crate::tts::{AUDIO_EXTENSION, SpeechOptions, synthesize_chunks};
use anyhow::{Context, Result};
use log::{error, info, warn};
use speech_client::SpeechProvider;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Combined audio written to this path
    Written(PathBuf),
    /// The document had no narratable text
    Empty,
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<PathBuf>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed.len()
    }
}

/// Everything needed to narrate documents.
pub struct Pipeline<'a> {
    pub provider: &'a dyn SpeechProvider,
    pub combiner: &'a dyn AudioCombiner,
    pub options: SpeechOptions,
    pub max_chunk_size: usize,
    pub scratch_dir: PathBuf,
}

impl Pipeline<'_> {
    /// Narrate every Markdown file in `dir`.
    ///
    /// A failure in one document is logged and the run moves on to the next.
    pub async fn process_directory(&self, dir: &Path) -> Result<RunSummary> {
        self.check_scratch_dir(dir)?;

        let files = find_markdown_files(dir)?;
        let mut summary = RunSummary::default();

        if files.is_empty() {
            warn!("No markdown files found in {}", dir.display());
            return Ok(summary);
        }

        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Processing markdown file: {}", name);

            match self.process_document(&file).await {
                Ok(DocumentOutcome::Written(output)) => {
                    info!("Processed {} into {}", name, output.display());
                    summary.processed += 1;
                }
                Ok(DocumentOutcome::Empty) => {
                    warn!("Skipped {}: no text to narrate", name);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing {}: {:#}", name, e);
                    summary.failed.push(file);
                }
            }
        }

        Ok(summary)
    }

    /// Narrate one Markdown file into `<stem>.mp3` next to it.
    pub async fn process_document(&self, path: &Path) -> Result<DocumentOutcome> {
        let markdown = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let chunks = prepare_chunks(&markdown, self.max_chunk_size);
        info!("Text split into {} chunks", chunks.len());
        if chunks.is_empty() {
            return Ok(DocumentOutcome::Empty);
        }

        prepare_scratch_dir(&self.scratch_dir)?;
        let produced =
            synthesize_chunks(self.provider, &chunks, &self.options, &self.scratch_dir).await?;

        // The combiner takes whatever is in the scratch dir
        let listed = collect_chunk_files(&self.scratch_dir)?;
        if listed != produced {
            anyhow::bail!(
                "Scratch directory {} holds {} audio files, expected the {} just synthesized",
                self.scratch_dir.display(),
                listed.len(),
                produced.len()
            );
        }

        let output = output_path_for(path);
        if !combine_folder(self.combiner, &self.scratch_dir, &output)? {
            anyhow::bail!("No chunk audio was produced");
        }

        Ok(DocumentOutcome::Written(output))
    }

    /// Clearing the scratch dir must never touch the documents themselves.
    fn check_scratch_dir(&self, dir: &Path) -> Result<()> {
        let input = std::fs::canonicalize(dir)
            .with_context(|| format!("Input directory not found: {}", dir.display()))?;
        if let Ok(scratch) = std::fs::canonicalize(&self.scratch_dir) {
            if scratch == input {
                anyhow::bail!(
                    "Scratch directory {} is the input directory",
                    self.scratch_dir.display()
                );
            }
        }
        Ok(())
    }
}

/// Markdown files directly inside `dir`, sorted by name.
pub fn find_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.is_file() && is_markdown(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Check if a path is a Markdown file (case-insensitive)
fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Create `dir`, or delete the files left in it by a previous document.
pub fn prepare_scratch_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    Ok(())
}

/// `<dir>/<stem>.md` -> `<dir>/<stem>.mp3`
pub fn output_path_for(markdown: &Path) -> PathBuf {
    markdown.with_extension(AUDIO_EXTENSION)
}
