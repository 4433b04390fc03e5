use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::{
    catalog::ShotCatalog,
    compose::{ComposeOptions, Compositor},
    error::{ShotmarkError, ShotmarkResult},
    ffmpeg,
    frame::{FrameDir, load_image},
    marker::MarkerStyle,
    pipeline::{RunStats, Threading, run_frames},
    schedule::ActivationSchedule,
    window::{build_windows, selection_expression},
};

/// Where activation points come from.
///
/// `Uniform` recomputes them from the gap so markers sit centered in their
/// selection windows; `Metadata` trusts the `activation_frame` values stored
/// in the shot list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActivationSource {
    #[default]
    Uniform,
    Metadata,
}

/// One annotation job: the shot list plus every knob the run needs.
///
/// Deserialized from JSON by the CLI; `gap` and `shots` are required,
/// everything else has defaults.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct JobSpec {
    /// Half-width of each selection window, and the uniform activation
    /// spacing.
    pub gap: u64,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub activation: ActivationSource,
    pub shots: ShotCatalog,
    #[serde(default)]
    pub compose: ComposeOptions,
    #[serde(default)]
    pub marker: MarkerStyle,
}

fn default_fps() -> u32 {
    25
}

impl JobSpec {
    pub fn validate(&self) -> ShotmarkResult<()> {
        if self.gap == 0 {
            return Err(ShotmarkError::invalid_parameter("job gap must be > 0"));
        }
        if self.fps == 0 {
            return Err(ShotmarkError::invalid_parameter("job fps must be > 0"));
        }
        if self.shots.is_empty() {
            return Err(ShotmarkError::invalid_parameter(
                "job shot list must not be empty",
            ));
        }
        self.shots.validate()?;
        self.compose.validate()?;
        self.marker.validate()?;
        Ok(())
    }

    pub fn schedule(&self) -> ShotmarkResult<ActivationSchedule> {
        match self.activation {
            ActivationSource::Uniform => ActivationSchedule::uniform(self.shots.len(), self.gap),
            ActivationSource::Metadata => ActivationSchedule::from_catalog(&self.shots),
        }
    }
}

/// Options for [`annotate_to_mp4`].
#[derive(Clone, Debug)]
pub struct AnnotateToMp4Opts {
    /// Whether to overwrite the output file if it already exists.
    pub overwrite: bool,
    pub threading: Threading,
}

impl Default for AnnotateToMp4Opts {
    fn default() -> Self {
        Self {
            overwrite: true,
            threading: Threading::default(),
        }
    }
}

/// Run one job end to end: extract the windowed frames from `input`,
/// annotate every extracted frame, and assemble the result into an MP4.
///
/// `work_dir` receives `raw-frames/` and `marked-frames/` subdirectories.
/// They are created if absent and left in place afterwards, so a failed run
/// can be inspected; numbered frames left over from an earlier run are
/// removed before extraction, so a reused work directory cannot leak frames
/// into the output. `on_progress` receives whole percentages as the
/// annotation pass crosses 10-point boundaries.
#[tracing::instrument(skip(spec, out_path, on_progress))]
pub fn annotate_to_mp4(
    spec: &JobSpec,
    input: &Path,
    template_path: &Path,
    work_dir: &Path,
    out_path: impl Into<PathBuf>,
    opts: AnnotateToMp4Opts,
    on_progress: impl FnMut(u32),
) -> ShotmarkResult<RunStats> {
    spec.validate()?;
    if !ffmpeg::is_ffmpeg_on_path() {
        return Err(ShotmarkError::io(
            "ffmpeg is required for annotation runs, but was not found on PATH",
        ));
    }

    let schedule = spec.schedule()?;
    let windows = build_windows(&schedule, spec.gap)?;
    let expr = selection_expression(&windows);

    let template = load_image(template_path)?;
    let (tw, th) = template.dimensions();
    if !tw.is_multiple_of(2) || !th.is_multiple_of(2) {
        return Err(ShotmarkError::invalid_parameter(
            "template width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    let compositor = Compositor::new(template, spec.compose, spec.marker, &spec.shots)?;

    let raw = FrameDir::new(work_dir.join("raw-frames"));
    raw.reset()?;
    ffmpeg::extract_frames(input, &expr, &raw)?;
    let frame_count = raw.count();
    if frame_count == 0 {
        return Err(ShotmarkError::io(format!(
            "extraction produced no frames for '{}'",
            input.display()
        )));
    }

    let marked = FrameDir::new(work_dir.join("marked-frames"));
    marked.reset()?;

    let stats = run_frames(
        frame_count,
        &schedule,
        &spec.shots,
        &compositor,
        &opts.threading,
        |f| raw.load(f),
        |f, canvas| marked.save(f, &canvas),
        on_progress,
    )?;

    let out_path = out_path.into();
    ffmpeg::assemble_video(&marked, frame_count, spec.fps, &out_path, opts.overwrite)?;
    Ok(stats)
}

/// Annotate a single already-extracted frame. The active marker set is
/// resolved from the schedule exactly as the full run would.
pub fn annotate_frame(
    spec: &JobSpec,
    frames: &FrameDir,
    template_path: &Path,
    local_frame: u64,
) -> ShotmarkResult<RgbaImage> {
    if local_frame == 0 {
        return Err(ShotmarkError::invalid_parameter(
            "local frame index starts at 1",
        ));
    }
    spec.validate()?;

    let schedule = spec.schedule()?;
    let template = load_image(template_path)?;
    let compositor = Compositor::new(template, spec.compose, spec.marker, &spec.shots)?;

    let base = frames.load(local_frame)?;
    let active = &spec.shots.shots[..schedule.active_count(local_frame)];
    compositor.render(&base, active)
}
