//! Conditional probability tables.

use scirs2_core::ndarray::Array1;

use crate::codec::MixedRadix;
use crate::error::{BnError, Result};
use crate::variable::{IndexedAssignment, VarId, VariableRegistry};

/// One variable's distribution conditioned on an ordered list of parents.
///
/// The flat table is laid out over `[parent_1, ..., parent_k, variable]` with
/// the last position fastest: the variable's own value varies fastest, then
/// the last-declared parent, and the first-declared parent varies slowest.
#[derive(Clone, Debug)]
pub struct Cpt {
    variable: VarId,
    parents: Vec<VarId>,
    /// Names of `[parents..., variable]`, kept for error messages.
    names: Vec<String>,
    table: Array1<f64>,
    radix: MixedRadix,
}

impl Cpt {
    /// Build a CPT, checking that `table` has one entry per
    /// (value, parent assignment) combination.
    pub fn new(
        registry: &VariableRegistry,
        variable: VarId,
        parents: Vec<VarId>,
        table: Vec<f64>,
    ) -> Result<Self> {
        let scope: Vec<VarId> = parents.iter().copied().chain([variable]).collect();
        let radix = MixedRadix::new(scope.iter().map(|&v| registry.cardinality(v)).collect());

        if table.len() != radix.size() {
            return Err(BnError::TableSizeMismatch {
                variable: registry.name(variable).to_string(),
                expected: radix.size(),
                actual: table.len(),
            });
        }

        Ok(Self {
            variable,
            names: scope.iter().map(|&v| registry.name(v).to_string()).collect(),
            parents,
            table: Array1::from_vec(table),
            radix,
        })
    }

    pub fn variable(&self) -> VarId {
        self.variable
    }

    /// Parents in declaration order.
    pub fn parents(&self) -> &[VarId] {
        &self.parents
    }

    pub fn variable_name(&self) -> &str {
        &self.names[self.names.len() - 1]
    }

    /// `[parents..., variable]`, the table's dimension order.
    pub fn scope(&self) -> Vec<VarId> {
        self.parents
            .iter()
            .copied()
            .chain([self.variable])
            .collect()
    }

    pub fn table(&self) -> &Array1<f64> {
        &self.table
    }

    pub(crate) fn radix(&self) -> &MixedRadix {
        &self.radix
    }

    /// P(variable = `value` | parents as given in `assignment`).
    ///
    /// Only the parents are read from `assignment`; extra entries are ignored.
    pub fn probability(&self, value: usize, assignment: &IndexedAssignment) -> Result<f64> {
        let mut coords = Vec::with_capacity(self.radix.len());
        for (pos, parent) in self.parents.iter().enumerate() {
            let parent_value =
                assignment
                    .get(parent)
                    .copied()
                    .ok_or_else(|| BnError::IncompleteAssignment {
                        variable: self.names[pos].clone(),
                    })?;
            coords.push(parent_value);
        }
        coords.push(value);

        for (pos, &coord) in coords.iter().enumerate() {
            if coord >= self.radix.cardinality(pos) {
                return Err(BnError::ValueOutOfRange {
                    variable: self.names[pos].clone(),
                    index: coord,
                    cardinality: self.radix.cardinality(pos),
                });
            }
        }

        Ok(self.table[self.radix.encode(&coords)])
    }

    /// The distribution over the variable's domain for one parent assignment.
    pub fn distribution(&self, assignment: &IndexedAssignment) -> Result<Vec<f64>> {
        let card = self.radix.cardinality(self.radix.len() - 1);
        (0..card)
            .map(|value| self.probability(value, assignment))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::Variable;
    use approx::assert_abs_diff_eq;

    fn registry() -> (VariableRegistry, VarId, VarId, VarId) {
        let mut registry = VariableRegistry::new();
        let a = registry
            .insert(Variable::new("A", vec!["T".into(), "F".into()]).unwrap())
            .unwrap();
        let b = registry
            .insert(Variable::new("B", vec!["x".into(), "y".into(), "z".into()]).unwrap())
            .unwrap();
        let c = registry
            .insert(Variable::new("C", vec!["T".into(), "F".into()]).unwrap())
            .unwrap();
        (registry, a, b, c)
    }

    #[test]
    fn test_prior_lookup() {
        let (registry, a, _, _) = registry();
        let cpt = Cpt::new(&registry, a, Vec::new(), vec![0.2, 0.8]).unwrap();
        let empty = IndexedAssignment::new();

        assert_abs_diff_eq!(cpt.probability(0, &empty).unwrap(), 0.2);
        assert_abs_diff_eq!(cpt.probability(1, &empty).unwrap(), 0.8);
    }

    #[test]
    fn test_layout_value_fastest_first_parent_slowest() {
        let (registry, a, b, c) = registry();
        // P(C | A, B): 2 * 3 * 2 entries, entry = 100*a + 10*b + c
        let table: Vec<f64> = (0..2)
            .flat_map(|a| (0..3).flat_map(move |b| (0..2).map(move |c| (100 * a + 10 * b + c) as f64)))
            .collect();
        let cpt = Cpt::new(&registry, c, vec![a, b], table).unwrap();

        let mut assignment = IndexedAssignment::new();
        assignment.insert(a, 1);
        assignment.insert(b, 2);
        assert_abs_diff_eq!(cpt.probability(0, &assignment).unwrap(), 120.0);
        assert_abs_diff_eq!(cpt.probability(1, &assignment).unwrap(), 121.0);

        assignment.insert(a, 0);
        assignment.insert(b, 1);
        assert_abs_diff_eq!(cpt.probability(1, &assignment).unwrap(), 11.0);
    }

    #[test]
    fn test_table_size_mismatch() {
        let (registry, a, b, _) = registry();
        let err = Cpt::new(&registry, b, vec![a], vec![0.5; 5]).unwrap_err();
        assert!(matches!(
            err,
            BnError::TableSizeMismatch {
                expected: 6,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_parent_value() {
        let (registry, a, _, c) = registry();
        let cpt = Cpt::new(&registry, c, vec![a], vec![0.9, 0.1, 0.1, 0.9]).unwrap();
        let err = cpt.probability(0, &IndexedAssignment::new()).unwrap_err();
        assert!(matches!(err, BnError::IncompleteAssignment { variable } if variable == "A"));
    }

    #[test]
    fn test_value_out_of_range() {
        let (registry, a, _, _) = registry();
        let cpt = Cpt::new(&registry, a, Vec::new(), vec![0.2, 0.8]).unwrap();
        assert!(matches!(
            cpt.probability(2, &IndexedAssignment::new()),
            Err(BnError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let (registry, a, _, c) = registry();
        let cpt = Cpt::new(&registry, c, vec![a], vec![0.9, 0.1, 0.3, 0.7]).unwrap();
        for value in 0..2 {
            let mut assignment = IndexedAssignment::new();
            assignment.insert(a, value);
            let total: f64 = cpt.distribution(&assignment).unwrap().iter().sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        }
    }
}
