use image::RgbaImage;
use shotmark::{Compositor, JobSpec, build_windows, selection_expression};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let s = include_str!("../tests/data/job.json");
    let job: JobSpec = serde_json::from_str(s)?;
    job.validate()?;

    let schedule = job.schedule()?;
    let windows = build_windows(&schedule, job.gap)?;
    println!("select: {}", selection_expression(&windows));

    let template = RgbaImage::from_pixel(640, 640, image::Rgba([16, 16, 24, 255]));
    let compositor = Compositor::new(template, job.compose, job.marker, &job.shots)?;

    for f in [1u64, 10, 20, 30, 45, 60] {
        let shade = (40 + f * 3) as u8;
        let base = RgbaImage::from_pixel(1280, 720, image::Rgba([shade, 72, 96, 255]));
        let active = &job.shots.shots[..schedule.active_count(f)];
        let canvas = compositor.render(&base, active)?;
        println!("frame {f}: {} markers on {}x{}", active.len(), canvas.width(), canvas.height());
    }

    Ok(())
}
