use crate::error::{ShotmarkError, ShotmarkResult};

/// One shot from the source metadata: where its marker sits on screen and the
/// source frame at which it becomes active.
///
/// Ordinals are 1-based and define the marker's letter label via
/// [`ordinal_label`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShotRecord {
    pub ordinal: u32,
    pub activation_frame: u64,
    pub x: i32,
    pub y: i32,
}

impl ShotRecord {
    pub fn label(&self) -> String {
        ordinal_label(self.ordinal)
    }
}

/// The full shot list for one video, in ordinal order.
///
/// Serializes as a bare array of records.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ShotCatalog {
    pub shots: Vec<ShotRecord>,
}

impl ShotCatalog {
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    /// Ordinals must run exactly 1..=N in stored order. Every schedule and
    /// label computation downstream leans on that, so it is rejected here
    /// before any frame work starts.
    pub fn validate(&self) -> ShotmarkResult<()> {
        for (idx, shot) in self.shots.iter().enumerate() {
            let expected = idx as u32 + 1;
            if shot.ordinal != expected {
                return Err(ShotmarkError::invalid_parameter(format!(
                    "shot at index {idx} has ordinal {} (expected {expected}; ordinals must be contiguous from 1)",
                    shot.ordinal
                )));
            }
        }
        Ok(())
    }
}

/// Letter label for a 1-based ordinal: 1 -> "A", 26 -> "Z", 27 -> "AA".
///
/// Bijective base-26, so every positive ordinal gets a distinct label and
/// catalogs longer than 26 shots stay printable.
pub fn ordinal_label(ordinal: u32) -> String {
    let mut n = u64::from(ordinal);
    let mut buf = Vec::new();
    while n > 0 {
        n -= 1;
        buf.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}
