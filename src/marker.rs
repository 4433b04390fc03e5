use std::collections::BTreeMap;

use image::RgbaImage;

use crate::{
    catalog::ShotCatalog,
    error::{ShotmarkError, ShotmarkResult},
};

/// Visual parameters for one marker tile: a filled disc with the shot's
/// letter label centered on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MarkerStyle {
    pub diameter: u32,
    pub fill_rgba: [u8; 4],
    pub label_rgba: [u8; 4],
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            diameter: 15,
            fill_rgba: [255, 0, 0, 255],
            label_rgba: [0, 0, 0, 255],
        }
    }
}

impl MarkerStyle {
    pub fn validate(&self) -> ShotmarkResult<()> {
        if self.diameter == 0 {
            return Err(ShotmarkError::invalid_parameter(
                "marker diameter must be > 0",
            ));
        }
        Ok(())
    }
}

/// Prebuilt marker tiles, one per catalog label, rendered once before any
/// frame work and shared read-only across the run.
#[derive(Clone, Debug)]
pub struct MarkerAtlas {
    diameter: u32,
    tiles: BTreeMap<String, RgbaImage>,
}

impl MarkerAtlas {
    pub fn build(style: &MarkerStyle, catalog: &ShotCatalog) -> ShotmarkResult<Self> {
        style.validate()?;
        let mut tiles = BTreeMap::new();
        for shot in &catalog.shots {
            let label = shot.label();
            tiles
                .entry(label.clone())
                .or_insert_with(|| render_tile(style, &label));
        }
        Ok(Self {
            diameter: style.diameter,
            tiles,
        })
    }

    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    pub fn tile(&self, label: &str) -> Option<&RgbaImage> {
        self.tiles.get(label)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn render_tile(style: &MarkerStyle, label: &str) -> RgbaImage {
    let d = style.diameter;
    let mut tile = RgbaImage::new(d, d);

    let center = (d as f32 - 1.0) / 2.0;
    let radius = d as f32 / 2.0;
    for y in 0..d {
        for x in 0..d {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy <= radius * radius {
                tile.put_pixel(x, y, image::Rgba(style.fill_rgba));
            }
        }
    }

    stamp_label(&mut tile, label, style.label_rgba);
    tile
}

/// Draw the label centered on the tile from the built-in 5x7 glyphs, one
/// column of spacing between letters. Pixels falling outside the tile are
/// clipped.
fn stamp_label(tile: &mut RgbaImage, label: &str, color: [u8; 4]) {
    let letters: Vec<u8> = label
        .bytes()
        .filter(|b| b.is_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return;
    }

    let label_w = letters.len() as i64 * (GLYPH_W as i64 + 1) - 1;
    let x0 = (i64::from(tile.width()) - label_w) / 2;
    let y0 = (i64::from(tile.height()) - GLYPH_H as i64) / 2;

    for (li, letter) in letters.iter().enumerate() {
        let rows = GLYPHS[(letter - b'A') as usize];
        let gx0 = x0 + li as i64 * (GLYPH_W as i64 + 1);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px = gx0 + col as i64;
                let py = y0 + row as i64;
                if px < 0 || py < 0 || px >= i64::from(tile.width()) || py >= i64::from(tile.height())
                {
                    continue;
                }
                tile.put_pixel(px as u32, py as u32, image::Rgba(color));
            }
        }
    }
}

const GLYPH_W: usize = 5;
const GLYPH_H: usize = 7;

/// 5x7 uppercase glyphs, one byte per row, low 5 bits used, MSB-left.
const GLYPHS: [[u8; GLYPH_H]; 26] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ShotRecord;

    fn catalog(n: u32) -> ShotCatalog {
        ShotCatalog {
            shots: (1..=n)
                .map(|ordinal| ShotRecord {
                    ordinal,
                    activation_frame: u64::from(ordinal) * 10,
                    x: 0,
                    y: 0,
                })
                .collect(),
        }
    }

    #[test]
    fn atlas_has_one_tile_per_label() {
        let atlas = MarkerAtlas::build(&MarkerStyle::default(), &catalog(4)).unwrap();
        assert_eq!(atlas.len(), 4);
        for label in ["A", "B", "C", "D"] {
            assert!(atlas.tile(label).is_some());
        }
        assert!(atlas.tile("E").is_none());
    }

    #[test]
    fn tile_is_square_of_diameter() {
        let atlas = MarkerAtlas::build(&MarkerStyle::default(), &catalog(1)).unwrap();
        let tile = atlas.tile("A").unwrap();
        assert_eq!(tile.dimensions(), (15, 15));
    }

    #[test]
    fn tile_disc_fills_center_not_corners() {
        let style = MarkerStyle::default();
        let atlas = MarkerAtlas::build(&style, &catalog(1)).unwrap();
        let tile = atlas.tile("A").unwrap();

        // Corners lie outside the disc radius.
        assert_eq!(tile.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(tile.get_pixel(14, 14).0, [0, 0, 0, 0]);
        // Edge midpoints are inside.
        assert_eq!(tile.get_pixel(7, 0).0, style.fill_rgba);
        assert_eq!(tile.get_pixel(0, 7).0, style.fill_rgba);
    }

    #[test]
    fn tile_label_is_stamped_in_label_color() {
        let style = MarkerStyle::default();
        let atlas = MarkerAtlas::build(&style, &catalog(1)).unwrap();
        let tile = atlas.tile("A").unwrap();

        // Crossbar of the A runs through the tile center.
        assert_eq!(tile.get_pixel(7, 7).0, style.label_rgba);
        let stamped = tile
            .pixels()
            .filter(|p| p.0 == style.label_rgba)
            .count();
        assert!(stamped > 0);
    }

    #[test]
    fn distinct_labels_get_distinct_tiles() {
        let atlas = MarkerAtlas::build(&MarkerStyle::default(), &catalog(2)).unwrap();
        assert_ne!(
            atlas.tile("A").unwrap().as_raw(),
            atlas.tile("B").unwrap().as_raw()
        );
    }

    #[test]
    fn wide_labels_are_clipped_not_panicking() {
        let mut shots = catalog(1).shots;
        shots[0].ordinal = 703; // AAA
        let catalog = ShotCatalog { shots };
        let atlas = MarkerAtlas::build(&MarkerStyle::default(), &catalog).unwrap();
        assert!(atlas.tile("AAA").is_some());
    }

    #[test]
    fn zero_diameter_is_rejected() {
        let style = MarkerStyle {
            diameter: 0,
            ..MarkerStyle::default()
        };
        assert!(MarkerAtlas::build(&style, &catalog(1)).is_err());
    }
}
