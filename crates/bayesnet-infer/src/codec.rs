//! Mixed-radix encoding of multi-variable assignments into flat table indices.
//!
//! Every table in this crate (CPTs and factors) is a flat sequence addressed
//! through a [`MixedRadix`]: the last position varies fastest and the first
//! position slowest. A CPT over `variable` with parents `[p1, ..., pk]` is the
//! codec over `[p1, ..., pk, variable]`, which gives the variable stride 1 and
//! the last-declared parent the next stride.

/// Strides for a sequence of dimensions with the given cardinalities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixedRadix {
    cardinalities: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl MixedRadix {
    /// Precompute strides for `cardinalities` (last position fastest).
    pub fn new(cardinalities: Vec<usize>) -> Self {
        let mut strides = vec![0; cardinalities.len()];
        let mut stride = 1;
        for pos in (0..cardinalities.len()).rev() {
            strides[pos] = stride;
            stride *= cardinalities[pos];
        }

        Self {
            cardinalities,
            strides,
            size: stride,
        }
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.cardinalities.len()
    }

    /// True for the zero-dimensional radix (a single cell).
    pub fn is_empty(&self) -> bool {
        self.cardinalities.is_empty()
    }

    /// Number of distinct indices, i.e. the product of all cardinalities.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    pub fn cardinality(&self, pos: usize) -> usize {
        self.cardinalities[pos]
    }

    pub fn stride(&self, pos: usize) -> usize {
        self.strides[pos]
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Flat index of `coords`. `coords.len()` must equal [`Self::len`] and
    /// each coordinate must be below its cardinality.
    pub fn encode(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.strides.len());
        coords
            .iter()
            .zip(&self.strides)
            .map(|(&coord, &stride)| coord * stride)
            .sum()
    }

    /// Inverse of [`Self::encode`], writing coordinates into `coords`.
    pub fn decode(&self, index: usize, coords: &mut [usize]) {
        debug_assert_eq!(coords.len(), self.strides.len());
        let mut rest = index;
        for (coord, &stride) in coords.iter_mut().zip(&self.strides) {
            *coord = rest / stride;
            rest %= stride;
        }
    }

    /// Lazily enumerate every coordinate vector in index order.
    pub fn iter(&self) -> CartesianProduct {
        CartesianProduct::new(self.cardinalities.clone())
    }
}

/// Lazy iterator over the Cartesian product of a list of domains.
///
/// Yields coordinate vectors in the same order as [`MixedRadix::encode`]:
/// the first domain is outermost. A product with no domains yields exactly
/// one empty vector; a product containing an empty domain yields nothing.
#[derive(Clone, Debug)]
pub struct CartesianProduct {
    cardinalities: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl CartesianProduct {
    pub fn new(cardinalities: Vec<usize>) -> Self {
        let next = if cardinalities.contains(&0) {
            None
        } else {
            Some(vec![0; cardinalities.len()])
        };
        Self {
            cardinalities,
            next,
        }
    }
}

impl Iterator for CartesianProduct {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        // odometer increment, last position fastest
        let mut successor = current.clone();
        for pos in (0..successor.len()).rev() {
            successor[pos] += 1;
            if successor[pos] < self.cardinalities[pos] {
                self.next = Some(successor);
                break;
            }
            successor[pos] = 0;
        }

        Some(current)
    }
}
