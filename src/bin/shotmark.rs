use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shotmark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the activation schedule, selection windows, and ffmpeg
    /// selection expression for a job.
    Plan(PlanArgs),
    /// Annotate a single extracted frame as a PNG.
    Frame(FrameArgs),
    /// Annotate a full video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input job JSON.
    #[arg(long)]
    job: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Directory of extracted source frames (`1.png`, `2.png`, ...).
    #[arg(long)]
    frames: PathBuf,

    /// Background template PNG.
    #[arg(long)]
    template: PathBuf,

    /// Local frame index (1-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Background template PNG.
    #[arg(long)]
    template: PathBuf,

    /// Working directory for extracted and annotated frames.
    #[arg(long)]
    work_dir: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Annotate frames on a rayon thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker thread count (defaults to rayon's).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_job_json(path: &Path) -> anyhow::Result<shotmark::JobSpec> {
    let f = File::open(path).with_context(|| format!("open job '{}'", path.display()))?;
    let r = BufReader::new(f);
    let spec: shotmark::JobSpec = serde_json::from_reader(r).with_context(|| "parse job JSON")?;
    Ok(spec)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let spec = read_job_json(&args.job)?;
    spec.validate()?;

    let schedule = spec.schedule()?;
    let windows = shotmark::build_windows(&schedule, spec.gap)?;

    for (shot, (at, w)) in spec
        .shots
        .shots
        .iter()
        .zip(schedule.entries().iter().zip(&windows))
    {
        println!(
            "shot {}: activates at frame {at}, window [{}, {})",
            shot.label(),
            w.start,
            w.end
        );
    }
    println!("{}", shotmark::selection_expression(&windows));
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let spec = read_job_json(&args.job)?;
    spec.validate()?;

    let frames = shotmark::FrameDir::new(&args.frames);
    let canvas = shotmark::annotate_frame(&spec, &frames, &args.template, args.frame)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec = read_job_json(&args.job)?;
    spec.validate()?;

    if shotmark::ffmpeg::is_ffprobe_on_path()
        && let Ok(info) = shotmark::ffmpeg::probe_video(&args.in_path)
    {
        eprintln!(
            "input {}x{} @ {:.2} fps, {:.1}s",
            info.width,
            info.height,
            info.fps(),
            info.duration_sec
        );
    }

    let opts = shotmark::AnnotateToMp4Opts {
        overwrite: true,
        threading: shotmark::Threading {
            parallel: args.parallel,
            threads: args.threads,
            ..shotmark::Threading::default()
        },
    };

    let stats = shotmark::annotate_to_mp4(
        &spec,
        &args.in_path,
        &args.template,
        &args.work_dir,
        &args.out,
        opts,
        |percent| eprintln!("progress {percent}%"),
    )?;

    eprintln!(
        "annotated {} frames, {} markers active at the end",
        stats.frames_rendered, stats.markers_active
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
