//! Shotmark overlays sequential, labeled position markers onto decoded video
//! frames, driven by shot metadata that assigns each marker an activation
//! point and a screen position.
//!
//! A run is explicitly staged:
//!
//! 1. Validate the [`JobSpec`] and derive the [`ActivationSchedule`]
//! 2. Build selection windows and extract the matching source frames
//! 3. Composite each frame onto the template and stamp the active markers
//! 4. Assemble the annotated frames into an MP4
//!
//! [`annotate_to_mp4`] wraps all four stages; the [`guide`] module walks
//! through them in detail.
#![forbid(unsafe_code)]

pub mod blend;
pub mod catalog;
pub mod compose;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod guide;
pub mod job;
pub mod marker;
pub mod pipeline;
pub mod schedule;
pub mod window;

pub use catalog::{ShotCatalog, ShotRecord, ordinal_label};
pub use compose::{ComposeOptions, Compositor};
pub use error::{ShotmarkError, ShotmarkResult};
pub use frame::FrameDir;
pub use job::{ActivationSource, AnnotateToMp4Opts, JobSpec, annotate_frame, annotate_to_mp4};
pub use marker::{MarkerAtlas, MarkerStyle};
pub use pipeline::{ProgressTracker, RunStats, Threading, run_frames};
pub use schedule::ActivationSchedule;
pub use window::{SegmentWindow, build_windows, selection_expression};
