//! Factor representation and operations.
//!
//! A factor is a flat table over an ordered scope, addressed through the same
//! [`MixedRadix`] codec as CPTs. Every operation returns a new factor; none
//! mutates its inputs.

use scirs2_core::ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use crate::codec::MixedRadix;
use crate::cpt::Cpt;
use crate::error::{BnError, Result};
use crate::variable::{IndexedAssignment, VarId};

/// Arithmetic performed while answering a query.
///
/// Counting rule: one multiplication per output cell of every factor product
/// or chain-rule step, one addition per pair of values combined by a sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCost {
    pub additions: u64,
    pub multiplications: u64,
}

impl OperationCost {
    pub fn new(additions: u64, multiplications: u64) -> Self {
        Self {
            additions,
            multiplications,
        }
    }
}

impl Add for OperationCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            additions: self.additions + rhs.additions,
            multiplications: self.multiplications + rhs.multiplications,
        }
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.additions += rhs.additions;
        self.multiplications += rhs.multiplications;
    }
}

/// A factor in a Bayesian network: φ(X₁, ..., Xₖ) → ℝ⁺.
///
/// The scope order fixes the table layout (last variable fastest). It is an
/// indexing convention only: factors are always read back by assignment, so
/// two factors over the same variables in different orders are equivalent.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// Factor name for debugging
    pub name: String,
    scope: Vec<VarId>,
    radix: MixedRadix,
    values: Array1<f64>,
}

impl Factor {
    /// Create a factor, validating that `values` matches the scope's shape.
    pub fn new(
        name: impl Into<String>,
        scope: Vec<VarId>,
        cardinalities: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if scope.len() != cardinalities.len() {
            return Err(BnError::DimensionMismatch {
                expected: vec![scope.len()],
                got: vec![cardinalities.len()],
            });
        }
        for (i, var) in scope.iter().enumerate() {
            if scope[..i].contains(var) {
                return Err(BnError::InvalidNetwork(format!(
                    "factor scope lists {} twice",
                    var
                )));
            }
        }

        let radix = MixedRadix::new(cardinalities);
        if values.len() != radix.size() {
            return Err(BnError::DimensionMismatch {
                expected: vec![radix.size()],
                got: vec![values.len()],
            });
        }

        Ok(Self {
            name: name.into(),
            scope,
            radix,
            values: Array1::from_vec(values),
        })
    }

    /// The factor φ(parents, variable) = P(variable | parents).
    ///
    /// The CPT layout already is the factor layout over `[parents..., variable]`,
    /// so the table is shared unchanged.
    pub fn from_cpt(cpt: &Cpt) -> Self {
        Self {
            name: format!("P({})", cpt.variable_name()),
            scope: cpt.scope(),
            radix: cpt.radix().clone(),
            values: cpt.table().clone(),
        }
    }

    /// A scope-less factor holding a single value.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            scope: Vec::new(),
            radix: MixedRadix::new(Vec::new()),
            values: Array1::from_vec(vec![value]),
        }
    }

    pub fn scope(&self) -> &[VarId] {
        &self.scope
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn cardinalities(&self) -> &[usize] {
        self.radix.cardinalities()
    }

    /// Number of table cells.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.scope.contains(&var)
    }

    /// Get cardinality of a variable.
    pub fn get_cardinality(&self, var: VarId) -> Option<usize> {
        self.position(var).map(|pos| self.radix.cardinality(pos))
    }

    fn position(&self, var: VarId) -> Option<usize> {
        self.scope.iter().position(|&v| v == var)
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// Value at `assignment`, which must cover the whole scope. Entries for
    /// variables outside the scope are ignored.
    pub fn probability(&self, assignment: &IndexedAssignment) -> Result<f64> {
        let mut index = 0;
        for (pos, var) in self.scope.iter().enumerate() {
            let value = *assignment
                .get(var)
                .ok_or_else(|| BnError::IncompleteAssignment {
                    variable: var.to_string(),
                })?;
            if value >= self.radix.cardinality(pos) {
                return Err(BnError::ValueOutOfRange {
                    variable: var.to_string(),
                    index: value,
                    cardinality: self.radix.cardinality(pos),
                });
            }
            index += value * self.radix.stride(pos);
        }
        Ok(self.values[index])
    }

    /// Fix `var` to `value`, dropping it from the scope.
    ///
    /// A variable outside the scope leaves the factor unchanged.
    pub fn restrict(&self, var: VarId, value: usize) -> Result<Factor> {
        let Some(var_pos) = self.position(var) else {
            return Ok(self.clone());
        };

        let card = self.radix.cardinality(var_pos);
        if value >= card {
            return Err(BnError::ValueOutOfRange {
                variable: var.to_string(),
                index: value,
                cardinality: card,
            });
        }

        let (scope, radix) = self.without(var_pos);
        let offset = value * self.radix.stride(var_pos);
        let strides = self.strides_aligned_to(&scope);

        let values: Vec<f64> = radix
            .iter()
            .map(|coords| self.values[offset + dot(&coords, &strides)])
            .collect();

        Ok(Factor {
            name: format!("{}_reduced", self.name),
            scope,
            radix,
            values: Array1::from_vec(values),
        })
    }

    /// Compute the product of two factors.
    ///
    /// φ₁(X₁) * φ₂(X₂) = φ(X₁ ∪ X₂). The result's scope is this factor's scope
    /// followed by the variables only `other` has. Shared variables take one
    /// value per output cell, so only agreeing rows are joined. Counts one
    /// multiplication per output cell.
    pub fn multiply(&self, other: &Factor, cost: &mut OperationCost) -> Result<Factor> {
        let mut scope = self.scope.clone();
        let mut cardinalities = self.radix.cardinalities().to_vec();
        for (pos, &var) in other.scope.iter().enumerate() {
            let card = other.radix.cardinality(pos);
            match self.position(var) {
                Some(self_pos) if self.radix.cardinality(self_pos) != card => {
                    return Err(BnError::DimensionMismatch {
                        expected: vec![self.radix.cardinality(self_pos)],
                        got: vec![card],
                    });
                }
                Some(_) => {}
                None => {
                    scope.push(var);
                    cardinalities.push(card);
                }
            }
        }

        let radix = MixedRadix::new(cardinalities);
        let self_strides = self.strides_aligned_to(&scope);
        let other_strides = other.strides_aligned_to(&scope);

        let values: Vec<f64> = radix
            .iter()
            .map(|coords| {
                self.values[dot(&coords, &self_strides)]
                    * other.values[dot(&coords, &other_strides)]
            })
            .collect();
        cost.multiplications += values.len() as u64;

        Ok(Factor {
            name: format!("{}*{}", self.name, other.name),
            scope,
            radix,
            values: Array1::from_vec(values),
        })
    }

    /// Marginalize out a variable by summing over it.
    ///
    /// ∑ₓ φ(X, Y) = φ(Y). A variable outside the scope leaves the factor
    /// unchanged; eliminating the last variable leaves a single-cell factor.
    /// Every accumulated entry counts one addition.
    pub fn sum_out(&self, var: VarId, cost: &mut OperationCost) -> Factor {
        let Some(var_pos) = self.position(var) else {
            return self.clone();
        };

        let (scope, radix) = self.without(var_pos);
        let new_strides: Vec<usize> = {
            let mut aligned = Vec::with_capacity(self.scope.len());
            let mut j = 0;
            for pos in 0..self.scope.len() {
                if pos == var_pos {
                    aligned.push(0);
                } else {
                    aligned.push(radix.stride(j));
                    j += 1;
                }
            }
            aligned
        };

        let mut values = vec![0.0; radix.size()];
        let mut coords = vec![0; self.scope.len()];
        for (old_index, &value) in self.values.iter().enumerate() {
            self.radix.decode(old_index, &mut coords);
            values[dot(&coords, &new_strides)] += value;
        }
        cost.additions += self.size() as u64;

        Factor {
            name: format!("{}_marg", self.name),
            scope,
            radix,
            values: Array1::from_vec(values),
        }
    }

    /// Divide every entry by the total mass.
    pub fn normalize(&self) -> Result<Factor> {
        let sum = self.total();
        if sum == 0.0 {
            return Err(BnError::DegenerateFactor);
        }

        Ok(Factor {
            name: self.name.clone(),
            scope: self.scope.clone(),
            radix: self.radix.clone(),
            values: &self.values / sum,
        })
    }

    /// Scope and radix with position `pos` removed.
    fn without(&self, pos: usize) -> (Vec<VarId>, MixedRadix) {
        let mut scope = self.scope.clone();
        scope.remove(pos);
        let mut cardinalities = self.radix.cardinalities().to_vec();
        cardinalities.remove(pos);
        (scope, MixedRadix::new(cardinalities))
    }

    /// This factor's strides laid out along `target`'s positions, with 0 for
    /// variables this factor does not mention. The dot product of a `target`
    /// coordinate vector with these strides is the projected flat index.
    fn strides_aligned_to(&self, target: &[VarId]) -> Vec<usize> {
        target
            .iter()
            .map(|&var| self.position(var).map_or(0, |pos| self.radix.stride(pos)))
            .collect()
    }
}

fn dot(coords: &[usize], strides: &[usize]) -> usize {
    coords.iter().zip(strides).map(|(c, s)| c * s).sum()
}
