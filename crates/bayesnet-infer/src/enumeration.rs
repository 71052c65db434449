//! Inference by full enumeration.
//!
//! Sums the chain-rule joint over every assignment to the hidden variables.
//! Exponential in the number of hidden variables; kept as the baseline the
//! elimination algorithms are checked against.

use crate::error::{BnError, Result};
use crate::factor::OperationCost;
use crate::network::NetworkStructure;
use crate::query::{ConditionalQuery, QueryProcessor};
use crate::variable::{IndexedAssignment, VarId};

/// Chain-rule product of the CPT entries of every assigned variable, in
/// topological order.
///
/// Unassigned variables are skipped. An assigned variable whose parent is
/// unassigned fails with [`BnError::IncompleteAssignment`]. Counts one
/// multiplication per factor after the first.
pub fn joint_probability(
    network: &NetworkStructure,
    assignment: &IndexedAssignment,
) -> Result<(f64, OperationCost)> {
    let mut probability = 1.0;
    let mut factors = 0u64;

    for &var in network.topological_order() {
        let Some(&value) = assignment.get(&var) else {
            continue;
        };
        probability *= network.cpt(var).probability(value, assignment)?;
        factors += 1;
    }

    Ok((
        probability,
        OperationCost::new(0, factors.saturating_sub(1)),
    ))
}

/// P(query.variable = query.value | query.evidence) by enumeration.
pub fn enumerate(network: &NetworkStructure, query: &ConditionalQuery) -> Result<(f64, OperationCost)> {
    let hidden = network.hidden_variables(&query.observed());
    let processor = QueryProcessor::new(network);
    let mut cost = OperationCost::default();
    let mut assignment = query.evidence.clone();

    tracing::debug!(
        hidden = hidden.len(),
        "enumerating hidden assignments"
    );

    let numerator = sum_over_hidden(
        network,
        &processor,
        &hidden,
        &mut assignment,
        (query.variable, query.value),
        &mut cost,
    )?;

    let mut denominator = numerator;
    let card = network.variables().cardinality(query.variable);
    for value in (0..card).filter(|&v| v != query.value) {
        denominator += sum_over_hidden(
            network,
            &processor,
            &hidden,
            &mut assignment,
            (query.variable, value),
            &mut cost,
        )?;
    }
    cost.additions += card.saturating_sub(1) as u64;

    if denominator == 0.0 {
        return Err(BnError::DegenerateFactor);
    }

    Ok((numerator / denominator, cost))
}

/// Σ over hidden assignments of the joint with `target` fixed.
fn sum_over_hidden(
    network: &NetworkStructure,
    processor: &QueryProcessor<'_>,
    hidden: &[VarId],
    assignment: &mut IndexedAssignment,
    target: (VarId, usize),
    cost: &mut OperationCost,
) -> Result<f64> {
    assignment.insert(target.0, target.1);

    let mut total = 0.0;
    let mut terms = 0u64;
    for coords in processor.indexed_assignments(hidden) {
        for (&var, value) in hidden.iter().zip(coords) {
            assignment.insert(var, value);
        }
        let (p, joint_cost) = joint_probability(network, assignment)?;
        *cost += joint_cost;
        total += p;
        terms += 1;
    }
    cost.additions += terms.saturating_sub(1);

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkBuilder;
    use approx::assert_abs_diff_eq;

    fn chain() -> NetworkStructure {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("A", ["T", "F"])
            .variable("B", ["T", "F"])
            .variable("C", ["T", "F"])
            .cpt("A", Vec::<String>::new(), vec![0.3, 0.7])
            .cpt("B", ["A"], vec![0.8, 0.2, 0.1, 0.9])
            .cpt("C", ["B"], vec![0.5, 0.5, 0.25, 0.75]);
        builder.build().unwrap()
    }

    fn ids(network: &NetworkStructure) -> (VarId, VarId, VarId) {
        (
            network.id("A").unwrap(),
            network.id("B").unwrap(),
            network.id("C").unwrap(),
        )
    }

    #[test]
    fn test_joint_full_assignment() {
        let network = chain();
        let (a, b, c) = ids(&network);
        let assignment: IndexedAssignment = [(a, 0), (b, 1), (c, 1)].into_iter().collect();

        let (p, cost) = joint_probability(&network, &assignment).unwrap();
        assert_abs_diff_eq!(p, 0.3 * 0.2 * 0.75, epsilon = 1e-12);
        assert_eq!(cost, OperationCost::new(0, 2));
    }

    #[test]
    fn test_joint_partial_skips_unassigned() {
        let network = chain();
        let (a, b, _) = ids(&network);
        let assignment: IndexedAssignment = [(a, 1), (b, 0)].into_iter().collect();

        let (p, cost) = joint_probability(&network, &assignment).unwrap();
        assert_abs_diff_eq!(p, 0.7 * 0.1, epsilon = 1e-12);
        assert_eq!(cost, OperationCost::new(0, 1));
    }

    #[test]
    fn test_joint_missing_parent_fails() {
        let network = chain();
        let (_, _, c) = ids(&network);
        let assignment: IndexedAssignment = [(c, 0)].into_iter().collect();
        assert!(matches!(
            joint_probability(&network, &assignment),
            Err(BnError::IncompleteAssignment { .. })
        ));
    }

    #[test]
    fn test_enumeration_counts() {
        let network = chain();
        let (a, _, c) = ids(&network);
        // P(A=T | C=T): hidden = {B}
        let query = ConditionalQuery {
            variable: a,
            value: 0,
            evidence: [(c, 0)].into_iter().collect(),
        };

        let (p, cost) = enumerate(&network, &query).unwrap();
        let num = 0.3 * (0.8 * 0.5 + 0.2 * 0.25);
        let den = num + 0.7 * (0.1 * 0.5 + 0.9 * 0.25);
        assert_abs_diff_eq!(p, num / den, epsilon = 1e-12);

        // 2 values x 2 hidden terms x 2 multiplications; 2*2 - 1 additions
        assert_eq!(cost, OperationCost::new(3, 8));
    }

    #[test]
    fn test_enumeration_without_hidden_variables() {
        let network = chain();
        let (a, b, c) = ids(&network);
        let query = ConditionalQuery {
            variable: b,
            value: 0,
            evidence: [(a, 0), (c, 1)].into_iter().collect(),
        };

        let (p, cost) = enumerate(&network, &query).unwrap();
        let num = 0.3 * 0.8 * 0.5;
        let den = num + 0.3 * 0.2 * 0.75;
        assert_abs_diff_eq!(p, num / den, epsilon = 1e-12);
        assert_eq!(cost, OperationCost::new(1, 4));
    }
}
