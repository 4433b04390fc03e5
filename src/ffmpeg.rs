use std::path::Path;

use crate::{
    error::{ShotmarkError, ShotmarkResult},
    frame::FrameDir,
};

/// Probed properties of a source video.
#[derive(Clone, Debug)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
}

impl VideoInfo {
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ShotmarkResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

// System binaries rather than linked FFmpeg, so no native dev header/lib
// requirements.
pub fn probe_video(source_path: &Path) -> ShotmarkResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ShotmarkError::io(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ShotmarkError::io(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ShotmarkError::io(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ShotmarkError::io("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| ShotmarkError::io("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| ShotmarkError::io("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| ShotmarkError::io("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
    })
}

/// Decode the frames selected by `select_expr` into `frames` as numbered
/// PNGs starting at 1.
///
/// The expression is wrapped in filtergraph quotes so its commas survive the
/// filter parser, and `-fps_mode passthrough` keeps the selected frames
/// dense in the output numbering.
pub fn extract_frames(input: &Path, select_expr: &str, frames: &FrameDir) -> ShotmarkResult<()> {
    if select_expr.is_empty() {
        return Err(ShotmarkError::invalid_parameter(
            "selection expression must be non-empty",
        ));
    }
    frames.ensure_exists()?;

    let out = std::process::Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-i"])
        .arg(input)
        .args(["-vf", &format!("select='{select_expr}'")])
        .args(["-fps_mode", "passthrough"])
        .arg(frames.path().join("%d.png"))
        .output()
        .map_err(|e| ShotmarkError::io(format!("failed to run ffmpeg for extraction: {e}")))?;

    if !out.status.success() {
        return Err(ShotmarkError::io(format!(
            "ffmpeg extraction failed for '{}': {}",
            input.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// Encode the numbered frames back into an MP4, video only, libx264 with
/// yuv420p output.
///
/// Encoding stops after `frame_count` frames even when more numbered files
/// exist in the directory.
pub fn assemble_video(
    frames: &FrameDir,
    frame_count: u64,
    fps: u32,
    out_path: &Path,
    overwrite: bool,
) -> ShotmarkResult<()> {
    if frame_count == 0 {
        return Err(ShotmarkError::invalid_parameter(
            "assemble frame count must be > 0",
        ));
    }
    if fps == 0 {
        return Err(ShotmarkError::invalid_parameter("assemble fps must be > 0"));
    }
    ensure_parent_dir(out_path)?;
    if !overwrite && out_path.exists() {
        return Err(ShotmarkError::invalid_parameter(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(ShotmarkError::io(
            "ffmpeg is required for MP4 assembly, but was not found on PATH",
        ));
    }

    let mut cmd = std::process::Command::new("ffmpeg");
    if overwrite {
        cmd.arg("-y");
    } else {
        cmd.arg("-n");
    }
    cmd.args(["-v", "error", "-framerate", &fps.to_string()])
        .args(["-start_number", "1", "-i"])
        .arg(frames.path().join("%d.png"))
        .args(["-frames:v", &frame_count.to_string()])
        .args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(out_path);

    let out = cmd
        .output()
        .map_err(|e| ShotmarkError::io(format!("failed to run ffmpeg for assembly: {e}")))?;
    if !out.status.success() {
        return Err(ShotmarkError::io(format!(
            "ffmpeg assembly failed for '{}': {}",
            out_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
