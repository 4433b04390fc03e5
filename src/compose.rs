use image::{RgbaImage, imageops};

use crate::{
    blend,
    catalog::{ShotCatalog, ShotRecord},
    error::{ShotmarkError, ShotmarkResult},
    marker::{MarkerAtlas, MarkerStyle},
};

/// Geometry and blend parameters for fitting a source frame onto the
/// template.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ComposeOptions {
    /// Vertical offset of the square crop taken from the rotated frame.
    pub crop_offset_y: u32,
    /// Opacity applied to the fitted frame during the overlay blend.
    pub overlay_src_opacity: f32,
    /// Opacity applied to the template during the overlay blend.
    pub overlay_dst_opacity: f32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            crop_offset_y: 250,
            overlay_src_opacity: 0.5,
            overlay_dst_opacity: 0.9,
        }
    }
}

impl ComposeOptions {
    pub fn validate(&self) -> ShotmarkResult<()> {
        let opacities = [
            ("overlay_src_opacity", self.overlay_src_opacity),
            ("overlay_dst_opacity", self.overlay_dst_opacity),
        ];
        for (name, v) in opacities {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ShotmarkError::invalid_parameter(format!(
                    "{name} must be within [0, 1] (got {v})"
                )));
            }
        }
        Ok(())
    }
}

/// Per-frame annotation renderer.
///
/// Holds the background template, the fitted-frame geometry, and the
/// prebuilt marker atlas. All state is read-only after construction, so one
/// compositor can serve many frames (and many threads) at once.
pub struct Compositor {
    template: RgbaImage,
    opts: ComposeOptions,
    atlas: MarkerAtlas,
}

impl Compositor {
    pub fn new(
        template: RgbaImage,
        opts: ComposeOptions,
        style: MarkerStyle,
        catalog: &ShotCatalog,
    ) -> ShotmarkResult<Self> {
        opts.validate()?;
        if template.width() == 0 || template.height() == 0 {
            return Err(ShotmarkError::geometry("template image must be non-empty"));
        }
        let atlas = MarkerAtlas::build(&style, catalog)?;
        Ok(Self {
            template,
            opts,
            atlas,
        })
    }

    pub fn template_dimensions(&self) -> (u32, u32) {
        self.template.dimensions()
    }

    /// Compose one output frame: fit `base` onto a copy of the template with
    /// the overlay blend, then stamp every marker in `active` in slice order
    /// (ascending ordinal, so later markers draw over earlier ones).
    pub fn render(&self, base: &RgbaImage, active: &[ShotRecord]) -> ShotmarkResult<RgbaImage> {
        let fitted = self.fit_frame(base)?;
        let mut canvas = self.template.clone();
        blend::overlay_in_place(
            &mut canvas,
            fitted.as_raw(),
            self.opts.overlay_src_opacity,
            self.opts.overlay_dst_opacity,
        )?;
        for shot in active {
            self.stamp_marker(&mut canvas, shot)?;
        }
        Ok(canvas)
    }

    /// Rotate 90 degrees counter-clockwise, take the square crop at the
    /// configured vertical offset, and resize to the template's dimensions.
    fn fit_frame(&self, base: &RgbaImage) -> ShotmarkResult<RgbaImage> {
        if base.width() == 0 || base.height() == 0 {
            return Err(ShotmarkError::geometry("source frame must be non-empty"));
        }

        let rotated = imageops::rotate270(base);
        let side = rotated.width();
        let crop_bottom = u64::from(self.opts.crop_offset_y) + u64::from(side);
        if crop_bottom > u64::from(rotated.height()) {
            return Err(ShotmarkError::geometry(format!(
                "square crop of {side}px at y={} needs {crop_bottom}px, rotated frame is {}x{}",
                self.opts.crop_offset_y,
                rotated.width(),
                rotated.height()
            )));
        }

        let cropped =
            imageops::crop_imm(&rotated, 0, self.opts.crop_offset_y, side, side).to_image();
        let (tw, th) = self.template.dimensions();
        Ok(imageops::resize(
            &cropped,
            tw,
            th,
            imageops::FilterType::CatmullRom,
        ))
    }

    fn stamp_marker(&self, canvas: &mut RgbaImage, shot: &ShotRecord) -> ShotmarkResult<()> {
        let label = shot.label();
        let tile = self.atlas.tile(&label).ok_or_else(|| {
            ShotmarkError::invalid_parameter(format!(
                "no marker tile for label '{label}' (ordinal {})",
                shot.ordinal
            ))
        })?;

        for (tx, ty, px) in tile.enumerate_pixels() {
            let cx = i64::from(shot.x) + i64::from(tx);
            let cy = i64::from(shot.y) + i64::from(ty);
            if cx < 0 || cy < 0 || cx >= i64::from(canvas.width()) || cy >= i64::from(canvas.height())
            {
                continue;
            }
            let dst = canvas.get_pixel(cx as u32, cy as u32).0;
            let out = blend::source_over(dst, px.0);
            canvas.put_pixel(cx as u32, cy as u32, image::Rgba(out));
        }
        Ok(())
    }
}
