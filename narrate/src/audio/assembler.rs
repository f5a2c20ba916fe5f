//! Audio file assembly using FFmpeg, with a byte-level fallback.

use crate::tts::AUDIO_EXTENSION;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Joins an ordered list of audio files into one file.
pub trait AudioCombiner {
    /// Combiner name for logs.
    fn name(&self) -> &'static str;

    /// Concatenate `inputs`, in order, into `output`.
    fn combine(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// How to combine chunk audio, as chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CombinerKind {
    /// FFmpeg when it can be found, otherwise byte concatenation
    Auto,
    /// FFmpeg concat demuxer
    Ffmpeg,
    /// Append MP3 streams byte for byte
    Concat,
}

/// Pick a combiner; `ffmpeg_path` overrides the `PATH` lookup.
pub fn select_combiner(
    kind: CombinerKind,
    ffmpeg_path: Option<&Path>,
) -> Result<Box<dyn AudioCombiner>> {
    match kind {
        CombinerKind::Ffmpeg => Ok(Box::new(FfmpegCombiner::locate(ffmpeg_path)?)),
        CombinerKind::Concat => Ok(Box::new(ByteCombiner)),
        CombinerKind::Auto => match FfmpegCombiner::locate(ffmpeg_path) {
            Ok(ffmpeg) => Ok(Box::new(ffmpeg)),
            Err(e) => {
                warn!("{:#}; falling back to byte concatenation", e);
                Ok(Box::new(ByteCombiner))
            }
        },
    }
}

/// Combiner backed by FFmpeg's concat demuxer (lossless for same-format files).
#[derive(Debug, Clone)]
pub struct FfmpegCombiner {
    ffmpeg: PathBuf,
}

impl FfmpegCombiner {
    pub fn new(ffmpeg: PathBuf) -> Self {
        Self { ffmpeg }
    }

    /// Use the configured executable, or find `ffmpeg` in `PATH`.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        let ffmpeg = match configured {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("FFmpeg not found at configured path: {}", path.display());
                }
                path.to_path_buf()
            }
            None => which::which("ffmpeg").context("FFmpeg not found in PATH")?,
        };

        Ok(Self::new(ffmpeg))
    }
}

impl AudioCombiner for FfmpegCombiner {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn combine(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        if inputs.is_empty() {
            anyhow::bail!("No audio files provided");
        }

        if inputs.len() == 1 {
            // Just copy the single file
            std::fs::copy(&inputs[0], output)
                .with_context(|| format!("Failed to copy {}", inputs[0].display()))?;
            return Ok(());
        }

        // The concat demuxer resolves relative entries against the list file,
        // which lives in a temp dir, so every entry must be absolute
        let temp_dir = TempDir::new()?;
        let list_file = temp_dir.path().join("concat_list.txt");

        let mut list_content = String::new();
        for path in inputs {
            let absolute = std::fs::canonicalize(path)
                .with_context(|| format!("Audio file missing: {}", path.display()))?;
            let path_str = absolute.to_string_lossy().replace('\'', "'\\''");
            list_content.push_str(&format!("file '{}'\n", path_str));
        }
        std::fs::write(&list_file, &list_content)?;

        let result = Command::new(&self.ffmpeg)
            .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_file)
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .context("Failed to run ffmpeg concat")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("ffmpeg concat failed: {}", stderr.trim());
        }

        Ok(())
    }
}

/// Combiner that appends the files' bytes.
///
/// MP3 is a frame stream, so players handle the result, but headers and tags
/// of every chunk end up inside the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteCombiner;

impl AudioCombiner for ByteCombiner {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn combine(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        if inputs.is_empty() {
            anyhow::bail!("No audio files provided");
        }

        let mut out = File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        for path in inputs {
            let mut input =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            std::io::copy(&mut input, &mut out)?;
        }
        out.sync_all()?;

        Ok(())
    }
}

/// Audio files in `dir`, sorted by file name.
pub fn collect_chunk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry.context("Failed to read directory entry")?.path();
        let is_audio = path
            .extension()
            .and_then(OsStr::to_str)
            .map(|ext| ext.eq_ignore_ascii_case(AUDIO_EXTENSION))
            .unwrap_or(false);
        if path.is_file() && is_audio {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Combine every audio file in `dir` into `output`.
///
/// Returns `false`, without creating `output`, when there is nothing to combine.
pub fn combine_folder(combiner: &dyn AudioCombiner, dir: &Path, output: &Path) -> Result<bool> {
    info!(
        "Combining audio files in {} into {}",
        dir.display(),
        output.display()
    );

    let files = collect_chunk_files(dir)?;
    if files.is_empty() {
        warn!("No audio clips to combine in {}", dir.display());
        return Ok(false);
    }

    for file in &files {
        debug!("Processing file: {}", file.display());
    }

    combiner
        .combine(&files, output)
        .with_context(|| format!("{} could not combine audio", combiner.name()))?;
    info!("Combined audio saved to {}", output.display());

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::chunk_file_name;

    #[test]
    fn test_collect_sorts_beyond_nine_chunks() {
        let dir = tempfile::tempdir().unwrap();
        for i in (1..=12).rev() {
            std::fs::write(dir.path().join(chunk_file_name(i)), i.to_string()).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = collect_chunk_files(dir.path()).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        let expected: Vec<String> = (1..=12).map(chunk_file_name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_byte_combiner_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        let b = dir.path().join("b.mp3");
        std::fs::write(&a, b"first-").unwrap();
        std::fs::write(&b, b"second").unwrap();
        let output = dir.path().join("out.mp3");

        ByteCombiner.combine(&[a, b], &output).unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"first-second");
    }

    #[test]
    fn test_combine_folder_empty_makes_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("post.mp3");
        let scratch = dir.path().join("chunks");
        std::fs::create_dir(&scratch).unwrap();

        let combined = combine_folder(&ByteCombiner, &scratch, &output).unwrap();

        assert!(!combined);
        assert!(!output.exists());
    }

    #[test]
    fn test_combine_folder_orders_by_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("chunks");
        std::fs::create_dir(&scratch).unwrap();
        for i in 1..=11 {
            std::fs::write(scratch.join(chunk_file_name(i)), format!("[{}]", i)).unwrap();
        }
        let output = dir.path().join("post.mp3");

        assert!(combine_folder(&ByteCombiner, &scratch, &output).unwrap());

        let expected: String = (1..=11).map(|i| format!("[{}]", i)).collect();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), expected);
    }

    #[test]
    fn test_ffmpeg_single_input_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chunk_0001.mp3");
        std::fs::write(&input, b"ID3audio").unwrap();
        let output = dir.path().join("out.mp3");

        // Never invoked for a single input
        let combiner = FfmpegCombiner::new(PathBuf::from("/nonexistent/ffmpeg"));
        combiner.combine(&[input], &output).unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"ID3audio");
    }

    #[test]
    fn test_locate_rejects_missing_configured_path() {
        let result = FfmpegCombiner::locate(Some(Path::new("/nonexistent/ffmpeg")));
        assert!(result.is_err());
    }

    #[test]
    fn test_select_concat() {
        let combiner = select_combiner(CombinerKind::Concat, None).unwrap();
        assert_eq!(combiner.name(), "concat");
    }

    #[test]
    fn test_auto_falls_back_without_ffmpeg() {
        let combiner =
            select_combiner(CombinerKind::Auto, Some(Path::new("/nonexistent/ffmpeg"))).unwrap();
        assert_eq!(combiner.name(), "concat");
    }
}
