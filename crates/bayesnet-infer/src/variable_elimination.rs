//! Variable Elimination algorithm for exact inference.
//!
//! Variable Elimination is a classic exact inference algorithm that eliminates
//! variables one by one from the factor set. The complexity depends on the
//! elimination order, the result does not.

use crate::elimination_ordering::{EliminationOrdering, EliminationStrategy};
use crate::error::{BnError, Result};
use crate::factor::{Factor, OperationCost};
use crate::network::NetworkStructure;
use crate::query::ConditionalQuery;
use crate::variable::{IndexedAssignment, VarId};

/// Variable elimination algorithm for exact inference.
///
/// Computes posteriors by eliminating hidden variables in an order chosen by
/// an [`EliminationStrategy`] or given explicitly.
#[derive(Clone, Debug, Default)]
pub struct VariableElimination {
    /// Heuristic used when no explicit order is given
    pub strategy: EliminationStrategy,
    /// Explicit elimination order; hidden variables missing from it are
    /// summed out at the end.
    pub elimination_order: Option<Vec<VarId>>,
}

impl VariableElimination {
    /// Lexicographic elimination order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: EliminationStrategy) -> Self {
        Self {
            strategy,
            elimination_order: None,
        }
    }

    /// Create with a specific elimination order.
    pub fn with_order(order: Vec<VarId>) -> Self {
        Self {
            strategy: EliminationStrategy::default(),
            elimination_order: Some(order),
        }
    }

    /// P(query.variable = query.value | query.evidence).
    pub fn probability(
        &self,
        network: &NetworkStructure,
        query: &ConditionalQuery,
    ) -> Result<(f64, OperationCost)> {
        let (posterior, cost) = self.posterior(network, query.variable, &query.evidence)?;

        let mut target = IndexedAssignment::new();
        target.insert(query.variable, query.value);
        Ok((posterior.probability(&target)?, cost))
    }

    /// Normalized distribution of `variable` given `evidence`, as a factor
    /// over `[variable]`.
    pub fn posterior(
        &self,
        network: &NetworkStructure,
        variable: VarId,
        evidence: &IndexedAssignment,
    ) -> Result<(Factor, OperationCost)> {
        let mut cost = OperationCost::default();
        let mut factors = initial_factors(network, evidence)?;

        let hidden: Vec<VarId> = network
            .variables()
            .ids()
            .filter(|&v| v != variable && !evidence.contains_key(&v))
            .collect();

        let order = match &self.elimination_order {
            Some(custom) => custom
                .iter()
                .copied()
                .filter(|v| hidden.contains(v))
                .collect(),
            None => {
                let scopes: Vec<Vec<VarId>> = factors.iter().map(|f| f.scope().to_vec()).collect();
                EliminationOrdering::new(self.strategy, network.variables())
                    .compute_order(&scopes, &hidden)
            }
        };

        tracing::debug!(
            strategy = ?self.strategy,
            factors = factors.len(),
            order = ?order
                .iter()
                .map(|&v| network.variables().name(v))
                .collect::<Vec<_>>(),
            "variable elimination order"
        );

        // Eliminate variables one by one
        for &var in &order {
            factors = eliminate_variable(factors, var, &mut cost)?;
            tracing::trace!(
                variable = network.variables().name(var),
                remaining = factors.len(),
                "eliminated"
            );
        }

        // Multiply remaining factors
        let mut result = multiply_all_factors(factors, &mut cost)?;

        // Variables an explicit order left out
        let leftover: Vec<VarId> = result
            .scope()
            .iter()
            .copied()
            .filter(|&v| v != variable)
            .collect();
        for var in leftover {
            result = result.sum_out(var, &mut cost);
        }

        let card = network.variables().cardinality(variable);
        cost.additions += card.saturating_sub(1) as u64;
        let posterior = result.normalize()?;

        Ok((posterior, cost))
    }
}

/// One factor per CPT, restricted by every evidence variable it mentions.
/// Factors that collapse to a single cell are constants and are dropped.
fn initial_factors(network: &NetworkStructure, evidence: &IndexedAssignment) -> Result<Vec<Factor>> {
    let mut factors = Vec::with_capacity(network.num_variables());
    for cpt in network.cpts() {
        let mut factor = Factor::from_cpt(cpt);
        for (&var, &value) in evidence {
            if factor.contains(var) {
                factor = factor.restrict(var, value)?;
            }
        }
        push_unless_constant(&mut factors, factor)?;
    }
    Ok(factors)
}

/// Eliminate a single variable from a set of factors.
fn eliminate_variable(
    factors: Vec<Factor>,
    var: VarId,
    cost: &mut OperationCost,
) -> Result<Vec<Factor>> {
    // Find all factors containing this variable
    let (mut containing, mut result): (Vec<Factor>, Vec<Factor>) =
        factors.into_iter().partition(|f| f.contains(var));

    if containing.is_empty() {
        return Ok(result);
    }

    containing.sort_by_key(Factor::size);
    let product = multiply_all_factors(containing, cost)?;
    let marginalized = product.sum_out(var, cost);

    push_unless_constant(&mut result, marginalized)?;

    Ok(result)
}

/// Single-cell factors only scale the result and are dropped. A zero
/// constant means the evidence has no mass at all.
fn push_unless_constant(factors: &mut Vec<Factor>, factor: Factor) -> Result<()> {
    if factor.size() > 1 {
        factors.push(factor);
    } else if factor.total() == 0.0 {
        return Err(BnError::DegenerateFactor);
    }
    Ok(())
}

/// Multiply all factors together; an empty set is the constant 1.
fn multiply_all_factors(factors: Vec<Factor>, cost: &mut OperationCost) -> Result<Factor> {
    let mut iter = factors.into_iter();
    let Some(mut result) = iter.next() else {
        return Ok(Factor::constant("1", 1.0));
    };

    for factor in iter {
        result = result.multiply(&factor, cost)?;
    }

    Ok(result)
}
