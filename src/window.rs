use crate::{
    error::{ShotmarkError, ShotmarkResult},
    schedule::ActivationSchedule,
};

/// Half-open source-frame range `[start, end)` selecting the frames that
/// surround one activation point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SegmentWindow {
    pub start: u64,
    pub end: u64,
}

impl SegmentWindow {
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start && frame < self.end
    }

    pub fn len_frames(&self) -> u64 {
        self.end - self.start
    }
}

/// Build one window per activation entry: nominally
/// `[entry - gap, entry + gap)`, with the start pulled forward to the
/// previous window's end whenever the two would overlap. The result is
/// ascending and non-overlapping, so the frames selected from the source are
/// each selected exactly once.
pub fn build_windows(
    schedule: &ActivationSchedule,
    gap: u64,
) -> ShotmarkResult<Vec<SegmentWindow>> {
    if gap == 0 {
        return Err(ShotmarkError::invalid_parameter("window gap must be > 0"));
    }

    let mut windows = Vec::with_capacity(schedule.len());
    let mut prior_end = 0u64;
    for (idx, &at) in schedule.entries().iter().enumerate() {
        let naive_start = at.checked_sub(gap).ok_or_else(|| {
            ShotmarkError::invalid_parameter(format!(
                "gap {gap} exceeds activation point {at} at index {idx}"
            ))
        })?;
        let start = naive_start.max(prior_end);
        let end = at.checked_add(gap).ok_or_else(|| {
            ShotmarkError::invalid_parameter(format!(
                "window end overflows u64 at activation point {at}"
            ))
        })?;
        // Strictly increasing entries keep end above both the naive start and
        // the prior end, so abutment never collapses a window.
        windows.push(SegmentWindow { start, end });
        prior_end = end;
    }
    Ok(windows)
}

/// Selection expression for ffmpeg's `select` filter: one
/// `between(n,start,end)` term per window, joined with `+`, in window order.
pub fn selection_expression(windows: &[SegmentWindow]) -> String {
    let terms: Vec<String> = windows
        .iter()
        .map(|w| format!("between(n,{},{})", w.start, w.end))
        .collect();
    terms.join("+")
}
