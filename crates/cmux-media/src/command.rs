//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use cmux_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_progress_line, FfmpegProgress, ProgressCallback};

/// Builder for FFmpeg invocations.
///
/// Input and output are plain artifact names resolved against the engine's
/// working directory at run time.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: String,
    output: String,
    /// Arguments placed before `-i`
    input_args: Vec<String>,
    /// Arguments placed after `-i`
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Add an input argument (before `-i`).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after `-i`).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Seek position before decoding starts.
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Video filter chain.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Read the input through the concat demuxer.
    pub fn concat_demuxer(self) -> Self {
        self.input_arg("-f").input_arg("concat").input_arg("-safe").input_arg("0")
    }

    /// Codec, quality and pixel-format arguments.
    pub fn encoding(self, config: &EncodingConfig) -> Self {
        self.output_args(config.to_ffmpeg_args())
    }

    /// Relocate the moov atom so the output is progressively playable.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    /// The output artifact name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Build the full argument list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ];
        args.extend(self.input_args.clone());
        args.push("-i".to_string());
        args.push(self.input.clone());
        args.extend(self.output_args.clone());
        args.push(self.output.clone());
        args
    }
}

/// Runner for FFmpeg commands with progress reporting.
pub struct FfmpegRunner {
    program: PathBuf,
    current_dir: Option<PathBuf>,
}

impl FfmpegRunner {
    /// Create a runner for the given FFmpeg binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            current_dir: None,
        }
    }

    /// Resolve artifact names against this directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run an FFmpeg command, forwarding progress records to the callback.
    pub async fn run(&self, cmd: &FfmpegCommand, on_progress: ProgressCallback) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;

        // FFmpeg interleaves -progress records and error text on stderr;
        // progress records are forwarded, the rest is kept for diagnostics.
        let stderr = child.stderr.take();
        let parser = tokio::spawn(async move {
            let mut diagnostics = String::new();
            let Some(stderr) = stderr else {
                return diagnostics;
            };
            let mut lines = BufReader::new(stderr).lines();
            let mut current = FfmpegProgress::default();
            while let Ok(Some(line)) = lines.next_line().await {
                match parse_progress_line(&line, &mut current) {
                    Some(snapshot) => on_progress(snapshot),
                    None if !line.contains('=') => {
                        diagnostics.push_str(&line);
                        diagnostics.push('\n');
                    }
                    None => {}
                }
            }
            diagnostics
        });

        let status = child.wait().await?;
        let diagnostics = parser.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                (!diagnostics.is_empty()).then_some(diagnostics),
                status.code(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .seek(10.0)
            .duration(30.5)
            .video_filter("scale=1080:1920")
            .encoding(&EncodingConfig::default());

        let args = cmd.build_args();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < i, "-ss must come before -i");
        assert_eq!(args[ss + 1], "10.000");
        assert!(args.contains(&"30.500".to_string()));
        assert!(args.contains(&"scale=1080:1920".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_concat_command() {
        let cmd = FfmpegCommand::new("list.txt", "final.mp4")
            .concat_demuxer()
            .encoding(&EncodingConfig::default())
            .faststart();

        let args = cmd.build_args();
        let f = args.iter().position(|a| a == "-f").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert!(f < i, "concat demuxer flags must precede -i");
        assert_eq!(args[f + 1], "concat");
        assert!(args.contains(&"-safe".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
    }

    #[test]
    fn test_progress_flags_always_present() {
        let args = FfmpegCommand::new("a", "b").build_args();
        assert!(args.contains(&"-y".to_string()));
        assert!(args.contains(&"-progress".to_string()));
        assert!(args.contains(&"pipe:2".to_string()));
    }
}
