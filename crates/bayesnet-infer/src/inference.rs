//! High-level inference operations.
//!
//! [`InferenceEngine`] answers textual joint and conditional queries against a
//! borrowed, immutable network. It holds no per-query state, so one network
//! can serve many engines on many threads.

use serde::{Deserialize, Serialize};

use crate::enumeration::{enumerate, joint_probability};
use crate::elimination_ordering::EliminationStrategy;
use crate::error::{BnError, Result};
use crate::factor::OperationCost;
use crate::network::NetworkStructure;
use crate::query::{Algorithm, ConditionalQuery, QueryProcessor, QueryRequest};
use crate::variable::IndexedAssignment;
use crate::variable_elimination::VariableElimination;

/// Answer to a query plus the arithmetic spent on it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub probability: f64,
    pub additions: u64,
    pub multiplications: u64,
}

impl InferenceResult {
    pub fn new(probability: f64, cost: OperationCost) -> Self {
        Self {
            probability,
            additions: cost.additions,
            multiplications: cost.multiplications,
        }
    }

    pub fn cost(&self) -> OperationCost {
        OperationCost::new(self.additions, self.multiplications)
    }
}

/// Inference engine for Bayesian network queries.
#[derive(Clone, Copy, Debug)]
pub struct InferenceEngine<'a> {
    network: &'a NetworkStructure,
    processor: QueryProcessor<'a>,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(network: &'a NetworkStructure) -> Self {
        Self {
            network,
            processor: QueryProcessor::new(network),
        }
    }

    /// Get the network.
    pub fn network(&self) -> &'a NetworkStructure {
        self.network
    }

    pub fn processor(&self) -> &QueryProcessor<'a> {
        &self.processor
    }

    /// Joint probability of `P(X1=x1,...)` by the chain rule.
    ///
    /// The assignment may cover a subset of the variables as long as every
    /// assigned variable's parents are assigned too.
    pub fn joint_probability(&self, query: &str) -> Result<InferenceResult> {
        let assignment = self.processor.parse_joint(query)?;
        let (probability, cost) = joint_probability(self.network, &assignment)?;
        Ok(InferenceResult::new(probability, cost))
    }

    /// Conditional probability of `P(V=v|E1=e1,...)` with a batch selector
    /// (1 enumeration, 2 lexicographic elimination, 3 min-weight elimination).
    ///
    /// A query that is a single CPT entry is answered directly, whatever the
    /// selector.
    pub fn conditional_probability(&self, query: &str, selector: u32) -> Result<InferenceResult> {
        let parsed = self.processor.parse_conditional(query)?;
        if let Some(result) = self.cpt_lookup(&parsed)? {
            return Ok(result);
        }
        self.dispatch(&parsed, Algorithm::from_selector(selector)?)
    }

    /// Conditional probability with an already validated algorithm.
    pub fn conditional(&self, query: &str, algorithm: Algorithm) -> Result<InferenceResult> {
        let parsed = self.processor.parse_conditional(query)?;
        if let Some(result) = self.cpt_lookup(&parsed)? {
            return Ok(result);
        }
        self.dispatch(&parsed, algorithm)
    }

    /// Evaluate one parsed batch line.
    pub fn evaluate(&self, request: &QueryRequest) -> Result<InferenceResult> {
        match request {
            QueryRequest::Joint(query) => self.joint_probability(query),
            QueryRequest::Conditional {
                expression,
                selector,
            } => self.conditional_probability(expression, *selector),
        }
    }

    /// Parse and evaluate one batch line.
    pub fn evaluate_line(&self, line: &str) -> Result<InferenceResult> {
        self.evaluate(&QueryRequest::parse_line(line)?)
    }

    fn cpt_lookup(&self, query: &ConditionalQuery) -> Result<Option<InferenceResult>> {
        if !self.processor.is_cpt_entry(query) {
            return Ok(None);
        }
        let probability = self
            .network
            .cpt(query.variable)
            .probability(query.value, &query.evidence)?;
        tracing::debug!(
            variable = self.network.variables().name(query.variable),
            "answered directly from CPT"
        );
        Ok(Some(InferenceResult::new(
            probability,
            OperationCost::default(),
        )))
    }

    fn dispatch(&self, query: &ConditionalQuery, algorithm: Algorithm) -> Result<InferenceResult> {
        tracing::debug!(
            variable = self.network.variables().name(query.variable),
            evidence = query.evidence.len(),
            ?algorithm,
            "conditional query"
        );

        let (probability, cost) = match algorithm {
            Algorithm::Enumeration => enumerate(self.network, query)?,
            Algorithm::EliminationLexicographic => {
                VariableElimination::with_strategy(EliminationStrategy::Lexicographic)
                    .probability(self.network, query)?
            }
            Algorithm::EliminationMinWeight => {
                VariableElimination::with_strategy(EliminationStrategy::MinWeight)
                    .probability(self.network, query)?
            }
        };

        Ok(InferenceResult::new(probability, cost))
    }

    /// Posterior distribution of `variable` given evidence text
    /// `E1=e1,E2=e2` (possibly empty), as `(label, probability)` pairs in
    /// domain order.
    pub fn distribution(
        &self,
        variable: &str,
        evidence: &str,
        strategy: EliminationStrategy,
    ) -> Result<Vec<(String, f64)>> {
        let text = format!("P({})", evidence);
        let evidence: IndexedAssignment = self
            .processor
            .resolve(&text, &self.processor.parse_assignments(&text)?)?;
        let id = self.network.id(variable).ok_or_else(|| {
            BnError::malformed(variable, format!("unknown variable {}", variable))
        })?;

        let (posterior, _) =
            VariableElimination::with_strategy(strategy).posterior(self.network, id, &evidence)?;

        let var = self.network.variable(id);
        var.outcomes()
            .iter()
            .enumerate()
            .map(|(value, label)| {
                let mut at = IndexedAssignment::new();
                at.insert(id, value);
                Ok((label.clone(), posterior.probability(&at)?))
            })
            .collect()
    }
}
