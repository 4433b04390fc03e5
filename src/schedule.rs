use crate::{
    catalog::ShotCatalog,
    error::{ShotmarkError, ShotmarkResult},
};

/// Activation points for a shot list, one source-frame index per shot, in
/// strictly increasing order.
///
/// The uniform derivation spaces markers evenly: the first activates `gap`
/// frames in, and each subsequent one `2 * gap` frames after the previous,
/// which centers every activation inside its selection window
/// (see [`build_windows`](crate::window::build_windows)).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationSchedule {
    entries: Vec<u64>,
}

impl ActivationSchedule {
    /// Derive the canonical evenly-spaced schedule: `gap, 3*gap, 5*gap, ...`.
    pub fn uniform(count: usize, gap: u64) -> ShotmarkResult<Self> {
        if gap == 0 {
            return Err(ShotmarkError::invalid_parameter(
                "activation gap must be > 0",
            ));
        }

        let mut entries = Vec::with_capacity(count);
        let mut at = gap;
        for i in 0..count {
            entries.push(at);
            if i + 1 < count {
                at = at
                    .checked_add(gap)
                    .and_then(|v| v.checked_add(gap))
                    .ok_or_else(|| {
                        ShotmarkError::invalid_parameter(
                            "activation schedule overflows u64 frame index",
                        )
                    })?;
            }
        }
        Ok(Self { entries })
    }

    /// Take the activation frames stored in the metadata verbatim instead of
    /// recomputing them. They must already be strictly increasing.
    pub fn from_catalog(catalog: &ShotCatalog) -> ShotmarkResult<Self> {
        let entries: Vec<u64> = catalog.shots.iter().map(|s| s.activation_frame).collect();
        for pair in entries.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ShotmarkError::invalid_parameter(format!(
                    "metadata activation frames must be strictly increasing (found {} then {})",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[u64] {
        &self.entries
    }

    /// How many markers are active at `local_frame`: the count of entries
    /// `<= local_frame`. Non-decreasing in the frame index.
    pub fn active_count(&self, local_frame: u64) -> usize {
        self.entries.partition_point(|&at| at <= local_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ShotRecord;

    #[test]
    fn uniform_spaces_entries_evenly() {
        let s = ActivationSchedule::uniform(3, 10).unwrap();
        assert_eq!(s.entries(), &[10, 30, 50]);
    }

    #[test]
    fn uniform_first_entry_equals_gap() {
        let s = ActivationSchedule::uniform(5, 7).unwrap();
        assert_eq!(s.entries()[0], 7);
        for pair in s.entries().windows(2) {
            assert_eq!(pair[1] - pair[0], 14);
        }
    }

    #[test]
    fn uniform_zero_count_is_empty() {
        let s = ActivationSchedule::uniform(0, 10).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn uniform_rejects_zero_gap() {
        assert!(ActivationSchedule::uniform(3, 0).is_err());
    }

    #[test]
    fn uniform_rejects_overflow() {
        assert!(ActivationSchedule::uniform(3, u64::MAX / 2).is_err());
    }

    #[test]
    fn uniform_allows_a_huge_final_entry() {
        let s = ActivationSchedule::uniform(1, u64::MAX / 2).unwrap();
        assert_eq!(s.entries(), &[u64::MAX / 2]);
    }

    #[test]
    fn uniform_is_deterministic() {
        let a = ActivationSchedule::uniform(16, 25).unwrap();
        let b = ActivationSchedule::uniform(16, 25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_catalog_keeps_values_verbatim() {
        let catalog = ShotCatalog {
            shots: vec![
                ShotRecord {
                    ordinal: 1,
                    activation_frame: 12,
                    x: 0,
                    y: 0,
                },
                ShotRecord {
                    ordinal: 2,
                    activation_frame: 40,
                    x: 0,
                    y: 0,
                },
            ],
        };
        let s = ActivationSchedule::from_catalog(&catalog).unwrap();
        assert_eq!(s.entries(), &[12, 40]);
    }

    #[test]
    fn from_catalog_rejects_non_increasing() {
        let catalog = ShotCatalog {
            shots: vec![
                ShotRecord {
                    ordinal: 1,
                    activation_frame: 40,
                    x: 0,
                    y: 0,
                },
                ShotRecord {
                    ordinal: 2,
                    activation_frame: 40,
                    x: 0,
                    y: 0,
                },
            ],
        };
        assert!(ActivationSchedule::from_catalog(&catalog).is_err());
    }

    #[test]
    fn active_count_is_monotone() {
        let s = ActivationSchedule::uniform(3, 10).unwrap();
        assert_eq!(s.active_count(0), 0);
        assert_eq!(s.active_count(9), 0);
        assert_eq!(s.active_count(10), 1);
        assert_eq!(s.active_count(25), 1);
        assert_eq!(s.active_count(30), 2);
        assert_eq!(s.active_count(50), 3);
        assert_eq!(s.active_count(u64::MAX), 3);

        let mut prev = 0;
        for f in 0..60 {
            let n = s.active_count(f);
            assert!(n >= prev);
            prev = n;
        }
    }
}
