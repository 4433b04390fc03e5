use crate::error::ShotmarkResult;

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Overlay-blend `src` onto `dst` with independent layer opacities, straight
/// alpha throughout.
///
/// Per channel the overlay curve doubles products below the midpoint and
/// screens above it:
/// `overlay(d, s) = 2*d*s/255` when `d < 128`, else
/// `255 - 2*(255-d)*(255-s)/255`. The blended color is then composited
/// source-over with the source alpha scaled by `src_opacity` and the
/// destination alpha scaled by `dst_opacity`. All divisions round to
/// nearest.
pub fn overlay_over(dst: Rgba8, src: Rgba8, src_opacity: f32, dst_opacity: f32) -> Rgba8 {
    let sa = mul_div255(u16::from(src[3]), opacity_byte(src_opacity));
    let da = mul_div255(u16::from(dst[3]), opacity_byte(dst_opacity));
    let da_scaled = mul_div255(u16::from(da), 255 - u16::from(sa));

    let out_a = u16::from(sa) + u16::from(da_scaled);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = out_a as u8;
    for i in 0..3 {
        let b = overlay_channel(dst[i], src[i]);
        let num = u32::from(b) * u32::from(sa)
            + u32::from(dst[i]) * u32::from(da_scaled)
            + u32::from(out_a) / 2;
        out[i] = (num / u32::from(out_a)) as u8;
    }
    out
}

/// Plain source-over for marker stamping, straight alpha, full opacity.
pub fn source_over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = src[3];
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let da_scaled = mul_div255(u16::from(dst[3]), 255 - u16::from(sa));
    let out_a = u16::from(sa) + u16::from(da_scaled);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = out_a as u8;
    for i in 0..3 {
        let num = u32::from(src[i]) * u32::from(sa)
            + u32::from(dst[i]) * u32::from(da_scaled)
            + u32::from(out_a) / 2;
        out[i] = (num / u32::from(out_a)) as u8;
    }
    out
}

/// Overlay-blend whole buffers in place. Both must be RGBA8 and the same
/// length.
pub fn overlay_in_place(
    dst: &mut [u8],
    src: &[u8],
    src_opacity: f32,
    dst_opacity: f32,
) -> ShotmarkResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(crate::ShotmarkError::invalid_parameter(
            "overlay_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = overlay_over(
            [d[0], d[1], d[2], d[3]],
            [s[0], s[1], s[2], s[3]],
            src_opacity,
            dst_opacity,
        );
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn overlay_channel(d: u8, s: u8) -> u8 {
    let d16 = u16::from(d);
    let s16 = u16::from(s);
    if d < 128 {
        mul_div255(2 * d16, s16)
    } else {
        255 - mul_div255(2 * (255 - d16), 255 - s16)
    }
}

fn opacity_byte(opacity: f32) -> u16 {
    let opacity = opacity.clamp(0.0, 1.0);
    ((opacity * 255.0).round() as i32).clamp(0, 255) as u16
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
