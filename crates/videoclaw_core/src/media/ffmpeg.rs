//! `ffmpeg` command runner.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::logging::ProjectLogger;

use super::{MediaError, MediaMerger, MediaResult};

/// Name of the concat list written next to the output.
const CONCAT_LIST: &str = "input_list.txt";

/// Merger backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegMerger {
    ffmpeg_path: PathBuf,
}

impl FfmpegMerger {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn run(&self, args: &[String], logger: &ProjectLogger) -> MediaResult<()> {
        let tool = self.ffmpeg_path.display().to_string();
        logger.command(&format!("{} {}", tool, args.join(" ")));

        let result = Command::new(&self.ffmpeg_path)
            .args(args)
            .output()
            .map_err(|e| MediaError::Io {
                operation: format!("executing {}", tool),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        for line in stdout.lines() {
            logger.output_line(line, false);
        }
        let stderr = String::from_utf8_lossy(&result.stderr);
        for line in stderr.lines() {
            logger.output_line(line, true);
        }

        if !result.status.success() {
            logger.show_tail("ffmpeg output");
            return Err(MediaError::CommandFailed {
                tool,
                exit_code: result.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Default for FfmpegMerger {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaMerger for FfmpegMerger {
    fn concat(&self, clips: &[PathBuf], output: &Path, logger: &ProjectLogger) -> MediaResult<()> {
        if clips.is_empty() {
            return Err(MediaError::NoInputs);
        }
        if let Some(missing) = clips.iter().find(|c| !c.exists()) {
            return Err(MediaError::InputMissing(missing.clone()));
        }

        let out_dir = output.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(out_dir).map_err(|e| MediaError::Io {
            operation: "creating output directory".to_string(),
            source: e,
        })?;

        let list_file = out_dir.join(CONCAT_LIST);
        fs::write(&list_file, concat_list(clips)).map_err(|e| MediaError::Io {
            operation: "writing concat list".to_string(),
            source: e,
        })?;

        let args = vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_file.display().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ];
        let result = self.run(&args, logger);

        // The list goes whether ffmpeg succeeded or not.
        let _ = fs::remove_file(&list_file);
        result
    }

    fn add_audio(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        logger: &ProjectLogger,
    ) -> MediaResult<()> {
        for input in [video, audio] {
            if !input.exists() {
                return Err(MediaError::InputMissing(input.to_path_buf()));
            }
        }

        let args = vec![
            "-i".to_string(),
            video.display().to_string(),
            "-i".to_string(),
            audio.display().to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ];
        self.run(&args, logger)
    }
}

/// Concat demuxer list: one `file '<path>'` line per clip.
fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            let escaped = clip.display().to_string().replace('\'', r"'\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}
