use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    catalog::ShotCatalog,
    compose::Compositor,
    error::{ShotmarkError, ShotmarkResult},
    schedule::ActivationSchedule,
};

/// Threading and chunking configuration for a frame run.
#[derive(Clone, Debug)]
pub struct Threading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for Threading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_rendered: u64,
    /// Markers active on the final frame.
    pub markers_active: usize,
}

/// Reports whole percentages as the run crosses 10-point boundaries.
///
/// A report fires when progress exceeds the last reported value by more than
/// ten points, and carries the floored percentage. Progress that jumps
/// several boundaries at once still produces a single report.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressTracker {
    last_percent: u32,
}

impl ProgressTracker {
    pub fn observe(&mut self, done: u64, total: u64) -> Option<u32> {
        if total == 0 {
            return None;
        }
        let scaled = u128::from(done) * 100;
        if scaled > u128::from(self.last_percent + 10) * u128::from(total) {
            let percent = (scaled / u128::from(total)) as u32;
            self.last_percent = percent;
            return Some(percent);
        }
        None
    }
}

/// Drive the compositor over local frames `1..=frame_count`.
///
/// For each frame the active marker set is the catalog prefix whose schedule
/// entries are `<= f`; it only ever grows as `f` advances. Frames are
/// emitted in ascending order whether rendering runs sequentially or on a
/// rayon pool, and the first failing frame aborts the run with nothing
/// emitted for it.
#[tracing::instrument(skip(schedule, catalog, compositor, load_frame, emit, on_progress))]
pub fn run_frames<L, E, P>(
    frame_count: u64,
    schedule: &ActivationSchedule,
    catalog: &ShotCatalog,
    compositor: &Compositor,
    threading: &Threading,
    load_frame: L,
    mut emit: E,
    mut on_progress: P,
) -> ShotmarkResult<RunStats>
where
    L: Fn(u64) -> ShotmarkResult<RgbaImage> + Sync,
    E: FnMut(u64, RgbaImage) -> ShotmarkResult<()>,
    P: FnMut(u32),
{
    if frame_count == 0 {
        return Err(ShotmarkError::invalid_parameter("frame count must be > 0"));
    }
    catalog.validate()?;
    if schedule.len() != catalog.len() {
        return Err(ShotmarkError::invalid_parameter(format!(
            "schedule has {} entries for {} shots",
            schedule.len(),
            catalog.len()
        )));
    }

    if !threading.parallel {
        return run_sequential(
            frame_count,
            schedule,
            catalog,
            compositor,
            load_frame,
            &mut emit,
            &mut on_progress,
        );
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut progress = ProgressTracker::default();
    let mut done = 0u64;

    let mut chunk_start = 1u64;
    loop {
        let chunk_end = chunk_start.saturating_add(chunk_size - 1).min(frame_count);
        let indices: Vec<u64> = (chunk_start..=chunk_end).collect();

        let rendered = pool.install(|| {
            indices
                .par_iter()
                .map(|&f| -> ShotmarkResult<RgbaImage> {
                    let active = &catalog.shots[..schedule.active_count(f)];
                    let base = load_frame(f)?;
                    compositor
                        .render(&base, active)
                        .map_err(|e| with_frame_index(f, e))
                })
                .collect::<Vec<_>>()
        });

        for (&f, frame) in indices.iter().zip(rendered) {
            emit(f, frame?)?;
            done += 1;
            if let Some(p) = progress.observe(done, frame_count) {
                on_progress(p);
            }
        }

        if chunk_end == frame_count {
            break;
        }
        chunk_start = chunk_end + 1;
    }

    Ok(RunStats {
        frames_rendered: frame_count,
        markers_active: schedule.active_count(frame_count),
    })
}

fn run_sequential<L, E, P>(
    frame_count: u64,
    schedule: &ActivationSchedule,
    catalog: &ShotCatalog,
    compositor: &Compositor,
    load_frame: L,
    emit: &mut E,
    on_progress: &mut P,
) -> ShotmarkResult<RunStats>
where
    L: Fn(u64) -> ShotmarkResult<RgbaImage>,
    E: FnMut(u64, RgbaImage) -> ShotmarkResult<()>,
    P: FnMut(u32),
{
    let entries = schedule.entries();
    let mut active_end = 0usize;
    let mut progress = ProgressTracker::default();

    for f in 1..=frame_count {
        while active_end < entries.len() && entries[active_end] <= f {
            active_end += 1;
        }
        let base = load_frame(f)?;
        let canvas = compositor
            .render(&base, &catalog.shots[..active_end])
            .map_err(|e| with_frame_index(f, e))?;
        emit(f, canvas)?;
        if let Some(p) = progress.observe(f, frame_count) {
            on_progress(p);
        }
    }

    Ok(RunStats {
        frames_rendered: frame_count,
        markers_active: active_end,
    })
}

fn with_frame_index(f: u64, err: ShotmarkError) -> ShotmarkError {
    match err {
        ShotmarkError::InvalidParameter(m) => {
            ShotmarkError::InvalidParameter(format!("frame {f}: {m}"))
        }
        ShotmarkError::Geometry(m) => ShotmarkError::Geometry(format!("frame {f}: {m}")),
        ShotmarkError::AssetMissing(m) => ShotmarkError::AssetMissing(format!("frame {f}: {m}")),
        ShotmarkError::Io(m) => ShotmarkError::Io(format!("frame {f}: {m}")),
        other @ ShotmarkError::Other(_) => other,
    }
}

fn build_thread_pool(threads: Option<usize>) -> ShotmarkResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ShotmarkError::invalid_parameter(
            "threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ShotmarkError::io(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 { 1 } else { chunk_size as u64 }
}
