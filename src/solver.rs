//! Deterministic elimination reconstruction.
//!
//! Recovers block bits from the four cross-sum vectors by forced-move
//! propagation. For every line (row, column, diagonal, anti-diagonal)
//! the solver tracks `u` — undecided cells remaining on the line — and
//! `r` — set bits still unaccounted for. Two situations force moves:
//!
//! - `r == 0`: every undecided cell on the line is `Clear`
//! - `r == u`: every undecided cell on the line is `Set`
//!
//! Each assignment updates all four families and locks the cell in the
//! solution matrix. Steps repeat until a full pass makes no progress;
//! the block is solved when every line has `u == 0`. Elimination alone
//! cannot decode arbitrary data — blocks it cannot finish are reported
//! unrecoverable, and the row digests are the final arbiter for blocks
//! it can.

use crate::bits::Bit;
use crate::config::DIGEST_SIZE;
use crate::crosssum::{anti_diag_index, diag_index};
use crate::rowhash::row_digest;
use crate::solution::SolutionMatrix;
use crate::{XsError, XsResult};

/// The four decoded cross-sum vectors of one block, in serialization
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSums {
    pub row: Vec<u16>,
    pub col: Vec<u16>,
    pub diag: Vec<u16>,
    pub anti: Vec<u16>,
}

impl BlockSums {
    /// Validate shape and bounds: four vectors of length `size`, every
    /// counter at most `size`, and all four totals equal (each family
    /// counts the same set bits).
    pub fn validate(&self, size: usize) -> XsResult<()> {
        let vecs = [&self.row, &self.col, &self.diag, &self.anti];
        for v in vecs {
            if v.len() != size {
                return Err(XsError::InvalidInput);
            }
            if v.iter().any(|&x| x as usize > size) {
                return Err(XsError::InvalidInput);
            }
        }
        let total: u64 = self.row.iter().map(|&x| x as u64).sum();
        for v in [&self.col, &self.diag, &self.anti] {
            if v.iter().map(|&x| x as u64).sum::<u64>() != total {
                return Err(XsError::InvalidInput);
            }
        }
        Ok(())
    }
}

/// One constraint family's line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Row,
    Col,
    Diag,
    Anti,
}

/// Per-family undecided/remaining counters.
#[derive(Debug, Clone)]
struct LineState {
    u: Vec<u16>,
    r: Vec<u16>,
}

/// Forced-move elimination over one block's constraints.
#[derive(Debug)]
pub struct Elimination {
    size: usize,
    matrix: SolutionMatrix,
    row: LineState,
    col: LineState,
    diag: LineState,
    anti: LineState,
}

impl Elimination {
    /// Set up solver state from decoded sums. Every line starts with
    /// `u = size` undecided cells and `r` equal to its counter.
    pub fn new(size: usize, sums: &BlockSums) -> XsResult<Self> {
        sums.validate(size)?;
        let fresh = |r: &[u16]| LineState {
            u: vec![size as u16; size],
            r: r.to_vec(),
        };
        Ok(Elimination {
            size,
            matrix: SolutionMatrix::new(size)?,
            row: fresh(&sums.row),
            col: fresh(&sums.col),
            diag: fresh(&sums.diag),
            anti: fresh(&sums.anti),
        })
    }

    /// Run elimination to quiescence. Returns `true` when every cell
    /// was decided, `false` when the pass stalled with cells left open.
    pub fn solve(&mut self) -> XsResult<bool> {
        loop {
            if self.solved() {
                return Ok(true);
            }
            if self.solve_step()? == 0 {
                return Ok(self.solved());
            }
        }
    }

    /// One pass of forced-move propagation across all four families.
    ///
    /// Moves are selected against a snapshot of the counters taken at
    /// the start of the pass, so only moves already forced on entry are
    /// applied; newly enabled moves wait for the next pass. Returns the
    /// number of newly solved cells.
    pub fn solve_step(&mut self) -> XsResult<usize> {
        let snap = [
            (Family::Row, self.row.clone()),
            (Family::Col, self.col.clone()),
            (Family::Diag, self.diag.clone()),
            (Family::Anti, self.anti.clone()),
        ];
        let mut progress = 0;
        for (family, state) in &snap {
            for i in 0..self.size {
                let u = state.u[i];
                let r = state.r[i];
                if u == 0 {
                    if r != 0 {
                        return Err(XsError::InvalidInput);
                    }
                } else if r == 0 {
                    progress += self.force_line(*family, i, Bit::Clear)?;
                } else if r == u {
                    progress += self.force_line(*family, i, Bit::Set)?;
                }
            }
        }
        Ok(progress)
    }

    /// Assign `value` to every still-undecided cell on line `i` of
    /// `family`. Returns the number of cells newly decided.
    fn force_line(&mut self, family: Family, i: usize, value: Bit) -> XsResult<usize> {
        let mut newly = 0;
        for k in 0..self.size {
            let (r, c) = match family {
                Family::Row => (i, k),
                Family::Col => (k, i),
                // Cell (r, c) lies on diagonal i when (r + c) mod s == i.
                Family::Diag => (k, (i + self.size - k) % self.size),
                // And on anti-diagonal i when (s - r + c - 1) mod s == i.
                Family::Anti => (k, (i + k + 1) % self.size),
            };
            if self.apply_cell(r, c, value)? {
                newly += 1;
            }
        }
        Ok(newly)
    }

    /// Decide one cell: update all four families' counters, then write
    /// and lock it. Already-locked cells are left alone — forced moves
    /// apply only to the cells still undecided on the line. Counter
    /// underflow means the sums were mutually inconsistent.
    fn apply_cell(&mut self, r: usize, c: usize, value: Bit) -> XsResult<bool> {
        if self.matrix.is_locked(r, c)? {
            return Ok(false);
        }
        let d = diag_index(r, c, self.size);
        let x = anti_diag_index(r, c, self.size);

        for (state, i) in [
            (&mut self.row, r),
            (&mut self.col, c),
            (&mut self.diag, d),
            (&mut self.anti, x),
        ] {
            if state.u[i] == 0 {
                return Err(XsError::InvalidInput);
            }
            state.u[i] -= 1;
        }
        if value.is_set() {
            for (state, i) in [
                (&mut self.row, r),
                (&mut self.col, c),
                (&mut self.diag, d),
                (&mut self.anti, x),
            ] {
                if state.r[i] == 0 {
                    return Err(XsError::InvalidInput);
                }
                state.r[i] -= 1;
            }
        }
        self.matrix.set(r, c, value)?;
        self.matrix.lock(r, c)?;
        Ok(true)
    }

    /// Whether every cell has been decided.
    pub fn solved(&self) -> bool {
        [&self.row, &self.col, &self.diag, &self.anti]
            .iter()
            .all(|s| s.u.iter().all(|&u| u == 0))
    }

    /// Consume the solver and take the solution matrix.
    pub fn into_matrix(self) -> SolutionMatrix {
        self.matrix
    }
}

/// Verify every reconstructed row against its stored digest.
///
/// The digests are the verification oracle: sums can be satisfied by a
/// wrong assignment only if elimination mis-stepped or the input lied,
/// and either way this catches it. Comparison is byte-wise.
pub fn verify_rows(matrix: &SolutionMatrix, digests: &[[u8; DIGEST_SIZE]]) -> XsResult<()> {
    if digests.len() != matrix.size() {
        return Err(XsError::InvalidInput);
    }
    for (r, stored) in digests.iter().enumerate() {
        let packed = matrix.row_bytes(r)?;
        if row_digest(&packed) != *stored {
            return Err(XsError::DigestMismatch);
        }
    }
    Ok(())
}
