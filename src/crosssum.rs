//! Cross-sum accumulators.
//!
//! A `CrossSum` is a vector of `s` bounded counters. Four instances with
//! different index mappings accumulate the row, column, diagonal, and
//! anti-diagonal bit counts of one block:
//!
//! - row:           `index = r`
//! - column:        `index = c`
//! - diagonal:      `index = (r + c) mod s`
//! - anti-diagonal: `index = (s - r + c - 1) mod s`
//!
//! For fixed `r`, both diagonal mappings are bijections of `[0, s)` as `c`
//! varies (and vice versa), so every cell contributes to exactly one
//! counter per family.

use crate::bits::Bit;
use crate::{XsError, XsResult};

/// One family of `s` bit-count accumulators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossSum {
    elems: Vec<u16>,
}

impl CrossSum {
    /// Create `size` zeroed counters. A zero size is a configuration
    /// error and is rejected up front.
    pub fn new(size: usize) -> XsResult<Self> {
        if size == 0 {
            return Err(XsError::BadSize);
        }
        Ok(CrossSum {
            elems: vec![0; size],
        })
    }

    /// Number of counters.
    #[inline]
    pub fn size(&self) -> usize {
        self.elems.len()
    }

    /// Add `bit`'s integer value to counter `index`. A counter that
    /// would exceed `u16::MAX` is an error, not a wrap; callers bound by
    /// a block dimension never come near it.
    pub fn push(&mut self, index: usize, bit: Bit) -> XsResult<()> {
        let e = self.elems.get_mut(index).ok_or(XsError::OutOfRange)?;
        *e = e.checked_add(bit.value()).ok_or(XsError::OutOfRange)?;
        Ok(())
    }

    /// Counter value at `index`.
    pub fn value(&self, index: usize) -> XsResult<u16> {
        self.elems.get(index).copied().ok_or(XsError::OutOfRange)
    }

    /// All counters in matrix order.
    #[inline]
    pub fn values(&self) -> &[u16] {
        &self.elems
    }
}

/// Diagonal counter index for cell `(r, c)` in an `s`-sized block.
#[inline]
pub fn diag_index(r: usize, c: usize, s: usize) -> usize {
    (r + c) % s
}

/// Anti-diagonal counter index for cell `(r, c)` in an `s`-sized block.
#[inline]
pub fn anti_diag_index(r: usize, c: usize, s: usize) -> usize {
    // r < s and c >= 0, so the expression never underflows in usize
    (s - r + c - 1) % s
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_rejects_zero_size() {
        assert_eq!(CrossSum::new(0).unwrap_err(), XsError::BadSize);
    }

    #[test]
    fn test_push_and_value() {
        let mut cs = CrossSum::new(4).unwrap();
        cs.push(2, Bit::Set).unwrap();
        cs.push(2, Bit::Set).unwrap();
        cs.push(2, Bit::Clear).unwrap();
        assert_eq!(cs.value(2).unwrap(), 2);
        assert_eq!(cs.value(0).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let mut cs = CrossSum::new(3).unwrap();
        assert_eq!(cs.push(3, Bit::Set), Err(XsError::OutOfRange));
        assert_eq!(cs.value(3), Err(XsError::OutOfRange));
    }

    #[test]
    fn test_counter_bounded_by_size() {
        let s = 16;
        let mut cs = CrossSum::new(s).unwrap();
        for _ in 0..s {
            cs.push(5, Bit::Set).unwrap();
        }
        assert_eq!(cs.value(5).unwrap(), s as u16);
    }

    #[test]
    fn test_push_overflow_rejected() {
        let mut cs = CrossSum::new(1).unwrap();
        for _ in 0..u16::MAX {
            cs.push(0, Bit::Set).unwrap();
        }
        assert_eq!(cs.push(0, Bit::Set), Err(XsError::OutOfRange));
        // The counter is left at its last valid value.
        assert_eq!(cs.value(0).unwrap(), u16::MAX);
        // Clear bits add nothing and still succeed.
        cs.push(0, Bit::Clear).unwrap();
        assert_eq!(cs.value(0).unwrap(), u16::MAX);
    }

    #[test]
    fn test_diag_mapping_is_bijection() {
        // For every s and fixed r, c -> (r+c) mod s must hit each index once.
        for s in 1..=64 {
            for r in 0..s {
                let mut seen = vec![false; s];
                for c in 0..s {
                    let idx = diag_index(r, c, s);
                    assert!(!seen[idx], "duplicate diag index for s={s} r={r}");
                    seen[idx] = true;
                }
            }
        }
    }

    #[test]
    fn test_anti_diag_mapping_is_bijection() {
        for s in 1..=64 {
            for r in 0..s {
                let mut seen = vec![false; s];
                for c in 0..s {
                    let idx = anti_diag_index(r, c, s);
                    assert!(!seen[idx], "duplicate anti-diag index for s={s} r={r}");
                    seen[idx] = true;
                }
            }
        }
    }

    #[test]
    fn test_mappings_bijective_in_r_for_fixed_c() {
        for s in [1usize, 2, 3, 5, 8, 31, 64] {
            for c in 0..s {
                let mut seen_d = vec![false; s];
                let mut seen_x = vec![false; s];
                for r in 0..s {
                    seen_d[diag_index(r, c, s)] = true;
                    seen_x[anti_diag_index(r, c, s)] = true;
                }
                assert!(seen_d.iter().all(|&b| b));
                assert!(seen_x.iter().all(|&b| b));
            }
        }
    }

    #[test]
    fn test_anti_diag_values_s2() {
        // s=2: (0,0)->1, (0,1)->0, (1,0)->0, (1,1)->1
        assert_eq!(anti_diag_index(0, 0, 2), 1);
        assert_eq!(anti_diag_index(0, 1, 2), 0);
        assert_eq!(anti_diag_index(1, 0, 2), 0);
        assert_eq!(anti_diag_index(1, 1, 2), 1);
    }

    #[test]
    fn test_accumulation_matches_naive_counts() {
        // Random bit matrix: each family's counters must equal a naive
        // per-line recount.
        let s = 24;
        let mut rng = rand::thread_rng();
        let grid: Vec<Vec<bool>> = (0..s)
            .map(|_| (0..s).map(|_| rng.gen_bool(0.5)).collect())
            .collect();

        let mut row = CrossSum::new(s).unwrap();
        let mut col = CrossSum::new(s).unwrap();
        let mut diag = CrossSum::new(s).unwrap();
        let mut anti = CrossSum::new(s).unwrap();
        for r in 0..s {
            for c in 0..s {
                let bit = Bit::from(grid[r][c]);
                row.push(r, bit).unwrap();
                col.push(c, bit).unwrap();
                diag.push(diag_index(r, c, s), bit).unwrap();
                anti.push(anti_diag_index(r, c, s), bit).unwrap();
            }
        }

        for i in 0..s {
            let row_naive = grid[i].iter().filter(|&&b| b).count() as u16;
            let col_naive = grid.iter().filter(|line| line[i]).count() as u16;
            assert_eq!(row.value(i).unwrap(), row_naive);
            assert_eq!(col.value(i).unwrap(), col_naive);
        }
        let total: u16 = grid.iter().flatten().filter(|&&b| b).count() as u16;
        assert_eq!(diag.values().iter().sum::<u16>(), total);
        assert_eq!(anti.values().iter().sum::<u16>(), total);
    }
}
