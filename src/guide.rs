//! # Shotmark guide
//!
//! This module is a standalone walkthrough of how a shotmark run works, from
//! shot metadata to an annotated MP4. If you are looking for commands, start
//! with the `shotmark` binary's `--help`; if you are extending the crate,
//! start here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`ShotCatalog`](crate::ShotCatalog): the shot list, 1-based ordinals,
//!   one marker position and activation point per shot
//! - [`ActivationSchedule`](crate::ActivationSchedule): the source frame at
//!   which each marker becomes active, strictly increasing
//! - [`SegmentWindow`](crate::SegmentWindow): a half-open source-frame range
//!   selected around one activation point
//! - [`Compositor`](crate::Compositor): renders one output frame from a
//!   source frame, the template, and the active marker set
//! - [`FrameDir`](crate::FrameDir): a directory of numbered PNGs, the
//!   interchange format between ffmpeg and the compositor
//!
//! The run is explicitly staged:
//!
//! 1. Derive the schedule: [`JobSpec::schedule`](crate::JobSpec::schedule)
//! 2. Build windows and the selection expression:
//!    [`build_windows`](crate::build_windows),
//!    [`selection_expression`](crate::selection_expression)
//! 3. Extract the selected frames:
//!    [`ffmpeg::extract_frames`](crate::ffmpeg::extract_frames)
//! 4. Annotate them in order: [`run_frames`](crate::run_frames)
//! 5. Re-encode: [`ffmpeg::assemble_video`](crate::ffmpeg::assemble_video)
//!
//! [`annotate_to_mp4`](crate::annotate_to_mp4) wraps stages 1 through 5.
//!
//! ---
//!
//! ## Scheduling and windows
//!
//! The uniform schedule places the first activation `gap` frames in and each
//! subsequent one `2 * gap` frames after the previous. Every window is
//! nominally `[activation - gap, activation + gap)`; when a window would
//! reach into its predecessor, its start is pulled forward to the
//! predecessor's end. For a uniform schedule the windows abut exactly, so
//! the extracted frame sequence is dense and each source frame appears at
//! most once.
//!
//! Windows become an ffmpeg `select` expression, one `between(n,a,b)` term
//! per window joined with `+`:
//!
//! ```rust
//! use shotmark::{ActivationSchedule, build_windows, selection_expression};
//!
//! # fn main() -> shotmark::ShotmarkResult<()> {
//! let schedule = ActivationSchedule::uniform(3, 10)?;
//! let windows = build_windows(&schedule, 10)?;
//! assert_eq!(
//!     selection_expression(&windows),
//!     "between(n,0,20)+between(n,20,40)+between(n,40,60)"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Straight alpha (shotmark's pixel contract)
//!
//! Every buffer in the crate is **straight** (non-premultiplied) RGBA8:
//! decoded PNGs stay straight, the overlay blend and marker stamping in
//! [`blend`](crate::blend) operate on straight pixels, and annotated frames
//! are written back as straight-alpha PNGs. If you feed frames in or out of
//! the pipeline, keep them straight.
//!
//! Per output frame the compositor:
//!
//! 1. rotates the source frame 90 degrees counter-clockwise
//! 2. crops a `side x side` square at the configured vertical offset, where
//!    `side` is the rotated width
//! 3. resizes the square to the template's dimensions (Catmull-Rom)
//! 4. overlay-blends it onto a copy of the template with the configured
//!    source/destination opacities
//! 5. stamps each active marker tile source-over at its shot position,
//!    ascending by ordinal
//!
//! Marker tiles come from a [`MarkerAtlas`](crate::MarkerAtlas) built once
//! per job; the letter labels use a built-in 5x7 glyph face so tile pixels
//! are identical on every machine.
//!
//! ---
//!
//! ## The frame run
//!
//! [`run_frames`](crate::run_frames) walks local frames `1..=frame_count`.
//! The active marker set at frame `f` is the catalog prefix whose schedule
//! entries are `<= f`; it never shrinks. The sequential path advances a
//! cursor; the parallel path recomputes the prefix per frame with a binary
//! search, renders chunks on a rayon pool, and still emits frames in
//! ascending order. Both paths produce byte-identical output.
//!
//! Progress reporting goes through a
//! [`ProgressTracker`](crate::ProgressTracker): one callback per crossed
//! 10-point boundary, carrying the floored percentage.
//!
//! The first failing frame aborts the run. Frame numbering must stay dense
//! for re-encoding, so there is no skip-and-continue.
//!
//! ---
//!
//! ## ffmpeg as a runtime prerequisite
//!
//! Shotmark does not link FFmpeg; it wraps the system `ffmpeg` and
//! `ffprobe` binaries and checks for them up front
//! ([`ffmpeg::is_ffmpeg_on_path`](crate::ffmpeg::is_ffmpeg_on_path)).
//! Extraction decodes only the selected windows; assembly re-encodes the
//! annotated PNGs with libx264 into yuv420p, video-only. Template
//! dimensions must be even for that pixel format, which
//! [`annotate_to_mp4`](crate::annotate_to_mp4) enforces before any frame
//! work starts.
