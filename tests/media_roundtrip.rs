use std::{path::Path, process::Command};

use shotmark::{
    ActivationSource, AnnotateToMp4Opts, ComposeOptions, FrameDir, JobSpec, MarkerStyle,
    ShotCatalog, ShotRecord,
};

fn ffmpeg_tools_available() -> bool {
    let ffmpeg_ok = Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    let ffprobe_ok = Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    ffmpeg_ok && ffprobe_ok
}

fn temp_root(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "shotmark_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn synth_video(root: &Path) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(root)?;

    let video_path = root.join("clip.mp4");
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=size=128x64:rate=25",
            "-t",
            "4",
            "-pix_fmt",
            "yuv420p",
            "-c:v",
            "libx264",
        ])
        .arg(&video_path)
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating clip.mp4");
    Ok(video_path)
}

fn write_template(root: &Path) -> std::path::PathBuf {
    let template = image::RgbaImage::from_pixel(64, 64, image::Rgba([0, 0, 255, 255]));
    let path = root.join("template.png");
    shotmark::frame::save_image(&path, &template).unwrap();
    path
}

fn two_shot_job() -> JobSpec {
    JobSpec {
        gap: 10,
        fps: 25,
        activation: ActivationSource::Uniform,
        shots: ShotCatalog {
            shots: vec![
                ShotRecord {
                    ordinal: 1,
                    activation_frame: 10,
                    x: 5,
                    y: 5,
                },
                ShotRecord {
                    ordinal: 2,
                    activation_frame: 30,
                    x: 30,
                    y: 30,
                },
            ],
        },
        compose: ComposeOptions {
            crop_offset_y: 0,
            ..ComposeOptions::default()
        },
        marker: MarkerStyle::default(),
    }
}

#[test]
fn probe_reports_synthesized_geometry() {
    if !ffmpeg_tools_available() {
        return;
    }
    let root = temp_root("probe");
    let clip = synth_video(&root).unwrap();

    let info = shotmark::ffmpeg::probe_video(&clip).unwrap();
    assert_eq!(info.width, 128);
    assert_eq!(info.height, 64);
    assert!((info.fps() - 25.0).abs() < 0.01);
    assert!(info.duration_sec > 3.0);
}

#[test]
fn extraction_selects_the_windowed_frames() {
    if !ffmpeg_tools_available() {
        return;
    }
    let root = temp_root("extract");
    let clip = synth_video(&root).unwrap();

    let frames = FrameDir::new(root.join("raw"));
    shotmark::ffmpeg::extract_frames(&clip, "between(n,0,9)", &frames).unwrap();

    // ffmpeg's between() is inclusive on both ends.
    assert_eq!(frames.count(), 10);
    assert!(frames.frame_path(1).is_file());
    assert!(frames.frame_path(10).is_file());

    let first = frames.load(1).unwrap();
    assert_eq!((first.width(), first.height()), (128, 64));
}

#[test]
fn reused_work_dir_drops_stale_frames() {
    if !ffmpeg_tools_available() {
        return;
    }
    let root = temp_root("reuse");
    let clip = synth_video(&root).unwrap();
    let template = write_template(&root);

    // Plant leftovers from a pretend earlier run on a longer input.
    let work = root.join("work");
    let raw = FrameDir::new(work.join("raw-frames"));
    let marked = FrameDir::new(work.join("marked-frames"));
    raw.ensure_exists().unwrap();
    marked.ensure_exists().unwrap();
    let stale = image::RgbaImage::from_pixel(128, 64, image::Rgba([200, 0, 200, 255]));
    for f in 1..=60 {
        raw.save(f, &stale).unwrap();
        marked.save(f, &stale).unwrap();
    }

    let spec = two_shot_job();
    let out = root.join("annotated.mp4");
    let stats = shotmark::annotate_to_mp4(
        &spec,
        &clip,
        &template,
        &work,
        &out,
        AnnotateToMp4Opts::default(),
        |_| {},
    )
    .unwrap();

    // Windows [0,20) and [20,40) select source frames 0..=40 inclusive; none
    // of the 60 planted frames may survive into the counts or the output.
    assert_eq!(stats.frames_rendered, 41);
    assert_eq!(raw.count(), 41);
    assert_eq!(marked.count(), 41);

    let info = shotmark::ffmpeg::probe_video(&out).unwrap();
    assert!((1.0..2.0).contains(&info.duration_sec));
}

#[test]
fn assembly_caps_at_the_requested_frame_count() {
    if !ffmpeg_tools_available() {
        return;
    }
    let root = temp_root("cap");
    let frames = FrameDir::new(root.join("frames"));
    frames.ensure_exists().unwrap();
    let img = image::RgbaImage::from_pixel(64, 64, image::Rgba([30, 60, 90, 255]));
    for f in 1..=30 {
        frames.save(f, &img).unwrap();
    }

    let out = root.join("capped.mp4");
    shotmark::ffmpeg::assemble_video(&frames, 10, 25, &out, true).unwrap();

    // 10 frames at 25 fps, not the 30 present on disk.
    let info = shotmark::ffmpeg::probe_video(&out).unwrap();
    assert!((info.duration_sec - 0.4).abs() < 0.15);
}

#[test]
fn annotate_to_mp4_produces_a_probeable_video() {
    if !ffmpeg_tools_available() {
        return;
    }
    let root = temp_root("annotate");
    let clip = synth_video(&root).unwrap();
    let template = write_template(&root);

    let spec = two_shot_job();
    let out = root.join("annotated.mp4");
    let mut percents = Vec::new();
    let stats = shotmark::annotate_to_mp4(
        &spec,
        &clip,
        &template,
        &root.join("work"),
        &out,
        AnnotateToMp4Opts::default(),
        |p| percents.push(p),
    )
    .unwrap();

    // Windows [0,20) and [20,40) select source frames 0..=40 inclusive.
    assert_eq!(stats.frames_rendered, 41);
    assert_eq!(stats.markers_active, 2);
    assert!(!percents.is_empty());
    assert!(percents.windows(2).all(|p| p[0] < p[1]));
    assert!(*percents.last().unwrap() >= 90);
    assert!(out.exists());

    let info = shotmark::ffmpeg::probe_video(&out).unwrap();
    assert_eq!(info.width, 64);
    assert_eq!(info.height, 64);
}
