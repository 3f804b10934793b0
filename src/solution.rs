//! Candidate solution matrix: the reconstruction pass's state container.
//!
//! An `s` × `s` grid of cells, each holding a tentative `Bit` and a lock
//! flag. The solver records deduced values here and locks a cell once the
//! constraints leave only one consistent assignment.
//!
//! Two variants share one implementation: `SolutionMatrix` performs no
//! internal synchronization and is meant for single-threaded use;
//! `SharedSolutionMatrix` puts the same matrix behind one exclusive lock
//! so multiple solver workers can touch it. Under single-threaded access
//! the two behave identically. Note that per-call locking does not make
//! call *sequences* atomic — `is_locked` followed by `set` is two
//! guarded operations, not one; use `with` to compose a check-then-act.

use std::sync::{Arc, Mutex};

use crate::bits::Bit;
use crate::{XsError, XsResult};

/// Unsynchronized candidate solution matrix.
#[derive(Debug, Clone)]
pub struct SolutionMatrix {
    size: usize,
    bits: Vec<u8>,
    locks: Vec<bool>,
}

impl SolutionMatrix {
    /// Create a `size` × `size` grid, all cells `Clear` and unlocked.
    /// Zero size is rejected up front.
    pub fn new(size: usize) -> XsResult<Self> {
        if size == 0 {
            return Err(XsError::BadSize);
        }
        let total = size * size;
        Ok(SolutionMatrix {
            size,
            bits: vec![0; total.div_ceil(8)],
            locks: vec![false; total],
        })
    }

    /// Grid dimension `s`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reallocate to a `size` × `size` grid, discarding all cell values
    /// and locks. Zero size is rejected and leaves the matrix untouched.
    pub fn resize(&mut self, size: usize) -> XsResult<()> {
        *self = SolutionMatrix::new(size)?;
        Ok(())
    }

    #[inline]
    fn index_of(&self, r: usize, c: usize) -> XsResult<usize> {
        if r >= self.size || c >= self.size {
            return Err(XsError::OutOfRange);
        }
        Ok(r * self.size + c)
    }

    /// Bit value at `(r, c)`.
    pub fn get(&self, r: usize, c: usize) -> XsResult<Bit> {
        let idx = self.index_of(r, c)?;
        Ok(Bit::from((self.bits[idx / 8] >> (7 - idx % 8)) & 1 == 1))
    }

    /// Store `value` at `(r, c)`. Fails on out-of-bounds coordinates and
    /// on locked cells; invalid numeric values never reach this method
    /// because `Bit` construction already rejects them.
    pub fn set(&mut self, r: usize, c: usize, value: Bit) -> XsResult<()> {
        let idx = self.index_of(r, c)?;
        if self.locks[idx] {
            return Err(XsError::LockedCell);
        }
        let mask = 1 << (7 - idx % 8);
        if value.is_set() {
            self.bits[idx / 8] |= mask;
        } else {
            self.bits[idx / 8] &= !mask;
        }
        Ok(())
    }

    /// Mark `(r, c)` as solved; later `set` calls on it fail.
    pub fn lock(&mut self, r: usize, c: usize) -> XsResult<()> {
        let idx = self.index_of(r, c)?;
        self.locks[idx] = true;
        Ok(())
    }

    /// Whether `(r, c)` has been locked.
    pub fn is_locked(&self, r: usize, c: usize) -> XsResult<bool> {
        let idx = self.index_of(r, c)?;
        Ok(self.locks[idx])
    }

    /// Pack row `r`'s bits MSB-first into `s / 8` bytes (or `ceil(s/8)`
    /// with trailing zero padding when `s` is not byte-aligned).
    pub fn row_bytes(&self, r: usize) -> XsResult<Vec<u8>> {
        if r >= self.size {
            return Err(XsError::OutOfRange);
        }
        let mut out = vec![0u8; self.size.div_ceil(8)];
        for c in 0..self.size {
            if self.get(r, c)?.is_set() {
                out[c / 8] |= 1 << (7 - c % 8);
            }
        }
        Ok(out)
    }
}

/// The same matrix behind one exclusive lock, cloneable across workers.
///
/// Every operation acquires the lock — reads included — so there is one
/// consistent discipline rather than a guarded write path next to an
/// unguarded mutation path.
#[derive(Debug, Clone)]
pub struct SharedSolutionMatrix {
    inner: Arc<Mutex<SolutionMatrix>>,
}

impl SharedSolutionMatrix {
    pub fn new(size: usize) -> XsResult<Self> {
        Ok(SharedSolutionMatrix {
            inner: Arc::new(Mutex::new(SolutionMatrix::new(size)?)),
        })
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, SolutionMatrix> {
        // A poisoned lock means a worker panicked mid-operation; the
        // matrix holds only plain assignments, so continue with the data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn size(&self) -> usize {
        self.locked().size()
    }

    pub fn resize(&self, size: usize) -> XsResult<()> {
        self.locked().resize(size)
    }

    pub fn get(&self, r: usize, c: usize) -> XsResult<Bit> {
        self.locked().get(r, c)
    }

    pub fn set(&self, r: usize, c: usize, value: Bit) -> XsResult<()> {
        self.locked().set(r, c, value)
    }

    pub fn lock(&self, r: usize, c: usize) -> XsResult<()> {
        self.locked().lock(r, c)
    }

    pub fn is_locked(&self, r: usize, c: usize) -> XsResult<bool> {
        self.locked().is_locked(r, c)
    }

    /// Run `f` against the matrix under a single lock acquisition.
    /// Check-then-act sequences belong here.
    pub fn with<T>(&self, f: impl FnOnce(&mut SolutionMatrix) -> T) -> T {
        f(&mut self.locked())
    }
}
