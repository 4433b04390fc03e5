use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{ShotmarkError, ShotmarkResult};

/// A directory of numbered PNG frames, `1.png` through `N.png`.
///
/// This is the interchange format on both sides of the pipeline: ffmpeg
/// extraction writes numbered frames in, annotation writes numbered frames
/// out, and assembly reads them back in order.
#[derive(Clone, Debug)]
pub struct FrameDir {
    dir: PathBuf,
}

impl FrameDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{index}.png"))
    }

    /// Number of consecutively numbered frames starting at 1. Counting stops
    /// at the first missing index, so stray files never inflate the count.
    pub fn count(&self) -> u64 {
        let mut n = 0u64;
        while self.frame_path(n + 1).is_file() {
            n += 1;
        }
        n
    }

    pub fn load(&self, index: u64) -> ShotmarkResult<RgbaImage> {
        load_image(&self.frame_path(index))
    }

    pub fn save(&self, index: u64, frame: &RgbaImage) -> ShotmarkResult<()> {
        save_image(&self.frame_path(index), frame)
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub fn ensure_exists(&self) -> ShotmarkResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            ShotmarkError::io(format!(
                "failed to create frame directory '{}': {e}",
                self.dir.display()
            ))
        })
    }

    /// Remove the numbered frames so a reused directory starts empty.
    ///
    /// Only `<n>.png` entries are removed; anything else in the directory is
    /// left alone. The directory itself is created if absent.
    pub fn reset(&self) -> ShotmarkResult<()> {
        self.ensure_exists()?;
        let scan_err = |e: std::io::Error| {
            ShotmarkError::io(format!(
                "failed to scan frame directory '{}': {e}",
                self.dir.display()
            ))
        };
        for entry in std::fs::read_dir(&self.dir).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if is_numbered_png(name) {
                std::fs::remove_file(entry.path()).map_err(|e| {
                    ShotmarkError::io(format!(
                        "failed to remove stale frame '{}': {e}",
                        entry.path().display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}

fn is_numbered_png(name: &str) -> bool {
    name.strip_suffix(".png")
        .is_some_and(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()))
}

pub fn load_image(path: &Path) -> ShotmarkResult<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        ShotmarkError::asset_missing(format!("cannot read image '{}': {e}", path.display()))
    })?;
    let dyn_img = image::load_from_memory(&bytes).map_err(|e| {
        ShotmarkError::io(format!("cannot decode image '{}': {e}", path.display()))
    })?;
    Ok(dyn_img.to_rgba8())
}

pub fn save_image(path: &Path, frame: &RgbaImage) -> ShotmarkResult<()> {
    frame
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ShotmarkError::io(format!("cannot write image '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "shotmark_frame_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn px(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, image::Rgba(rgba))
    }

    #[test]
    fn save_then_load_round_trips() {
        let frames = FrameDir::new(temp_dir("roundtrip"));
        let img = px([10, 20, 30, 255]);
        frames.save(1, &img).unwrap();
        let back = frames.load(1).unwrap();
        assert_eq!(back.as_raw(), img.as_raw());
    }

    #[test]
    fn count_stops_at_first_missing_index() {
        let frames = FrameDir::new(temp_dir("count"));
        assert_eq!(frames.count(), 0);

        let img = px([1, 2, 3, 255]);
        frames.save(1, &img).unwrap();
        frames.save(2, &img).unwrap();
        frames.save(4, &img).unwrap();
        assert_eq!(frames.count(), 2);
    }

    #[test]
    fn missing_frame_is_asset_missing() {
        let frames = FrameDir::new(temp_dir("missing"));
        let err = frames.load(7).unwrap_err();
        assert!(matches!(err, ShotmarkError::AssetMissing(_)));
        assert!(err.to_string().contains("7.png"));
    }

    #[test]
    fn undecodable_frame_is_io_error() {
        let frames = FrameDir::new(temp_dir("garbage"));
        std::fs::write(frames.frame_path(1), b"not a png").unwrap();
        let err = frames.load(1).unwrap_err();
        assert!(matches!(err, ShotmarkError::Io(_)));
    }

    #[test]
    fn ensure_exists_creates_nested_dirs() {
        let root = temp_dir("nested");
        let frames = FrameDir::new(root.join("a").join("b"));
        frames.ensure_exists().unwrap();
        assert!(frames.path().is_dir());
    }

    #[test]
    fn reset_removes_only_numbered_pngs() {
        let frames = FrameDir::new(temp_dir("reset"));
        let img = px([9, 9, 9, 255]);
        frames.save(1, &img).unwrap();
        frames.save(2, &img).unwrap();
        frames.save(17, &img).unwrap();
        std::fs::write(frames.path().join("notes.txt"), b"keep").unwrap();
        save_image(&frames.path().join("template.png"), &img).unwrap();

        frames.reset().unwrap();

        assert_eq!(frames.count(), 0);
        assert!(!frames.frame_path(17).is_file());
        assert!(frames.path().join("notes.txt").is_file());
        assert!(frames.path().join("template.png").is_file());
    }

    #[test]
    fn reset_creates_a_missing_directory() {
        let root = temp_dir("reset_missing");
        let frames = FrameDir::new(root.join("raw"));
        frames.reset().unwrap();
        assert!(frames.path().is_dir());
        assert_eq!(frames.count(), 0);
    }
}
