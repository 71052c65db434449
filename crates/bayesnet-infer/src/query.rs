//! Query text parsing and assignment handling.
//!
//! Grammar accepted at the boundary:
//!
//! ```text
//! joint        := "P(" pairs ")"
//! conditional  := "P(" pair "|" pairs? ")"
//! pairs        := pair ("," pair)*
//! pair         := NAME "=" LABEL
//! ```
//!
//! The algorithm selector of a conditional query is not part of this
//! grammar; see [`QueryRequest::parse_line`] for the batch line format.

use std::collections::HashSet;

use crate::codec::CartesianProduct;
use crate::error::{BnError, Result};
use crate::network::NetworkStructure;
use crate::variable::{Assignment, IndexedAssignment, VarId};

/// Resolved conditional query `P(variable=value | evidence)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionalQuery {
    pub variable: VarId,
    pub value: usize,
    pub evidence: IndexedAssignment,
}

impl ConditionalQuery {
    /// Query variable plus evidence variables.
    pub fn observed(&self) -> HashSet<VarId> {
        self.evidence
            .keys()
            .copied()
            .chain([self.variable])
            .collect()
    }
}

/// Exact-inference algorithm for conditional queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Sum the full joint over every hidden assignment.
    Enumeration,
    /// Variable elimination, hidden variables in name order.
    EliminationLexicographic,
    /// Variable elimination, greedy min-weight order.
    EliminationMinWeight,
}

impl Algorithm {
    /// Map the batch selector (1, 2 or 3) to an algorithm.
    pub fn from_selector(selector: u32) -> Result<Self> {
        match selector {
            1 => Ok(Self::Enumeration),
            2 => Ok(Self::EliminationLexicographic),
            3 => Ok(Self::EliminationMinWeight),
            other => Err(BnError::InvalidAlgorithm(other.to_string())),
        }
    }

    pub fn selector(&self) -> u32 {
        match self {
            Self::Enumeration => 1,
            Self::EliminationLexicographic => 2,
            Self::EliminationMinWeight => 3,
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = BnError;

    fn from_str(s: &str) -> Result<Self> {
        let selector: u32 = s
            .trim()
            .parse()
            .map_err(|_| BnError::InvalidAlgorithm(s.trim().to_string()))?;
        Self::from_selector(selector)
    }
}

/// One line of a batch query file.
///
/// The selector of a conditional line is kept raw: a query answered straight
/// from a CPT never consults it, so an out-of-range selector only fails when
/// an algorithm is actually needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryRequest {
    Joint(String),
    Conditional { expression: String, selector: u32 },
}

impl QueryRequest {
    /// Split a batch line. Lines containing `|` are conditional and carry
    /// the algorithm selector after their last comma.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim();
        if !line.contains('|') {
            return Ok(Self::Joint(line.to_string()));
        }

        let comma = line
            .rfind(',')
            .filter(|&pos| pos > line.rfind(')').unwrap_or(0))
            .ok_or_else(|| BnError::malformed(line, "missing algorithm selector after ','"))?;
        let raw = line[comma + 1..].trim();
        let selector = raw
            .parse()
            .map_err(|_| BnError::InvalidAlgorithm(raw.to_string()))?;

        Ok(Self::Conditional {
            expression: line[..comma].trim().to_string(),
            selector,
        })
    }
}

/// Converts between query text and assignments for one network.
#[derive(Clone, Copy, Debug)]
pub struct QueryProcessor<'a> {
    network: &'a NetworkStructure,
}

impl<'a> QueryProcessor<'a> {
    pub fn new(network: &'a NetworkStructure) -> Self {
        Self { network }
    }

    /// Parse `P(X=x,Y=y,...)` into a name-to-label mapping.
    ///
    /// Only the syntax is checked here; see [`Self::resolve`] for names and
    /// labels. `P()` yields an empty mapping.
    pub fn parse_assignments(&self, text: &str) -> Result<Assignment> {
        let body = strip_wrapper(text)?;
        parse_pairs(text, body)
    }

    /// Render `X=x,Y=y` in name order; the inverse of the body of
    /// [`Self::parse_assignments`].
    pub fn assignments_to_string(&self, assignment: &Assignment) -> String {
        assignment
            .iter()
            .map(|(var, value)| format!("{}={}", var, value))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Validate names and labels against the network.
    pub fn resolve(&self, query: &str, assignment: &Assignment) -> Result<IndexedAssignment> {
        assignment
            .iter()
            .map(|(name, label)| {
                let id = self
                    .network
                    .id(name)
                    .ok_or_else(|| BnError::malformed(query, format!("unknown variable {}", name)))?;
                let value = self.network.variable(id).index_of(label).ok_or_else(|| {
                    BnError::malformed(
                        query,
                        format!("{} is not an outcome of variable {}", label, name),
                    )
                })?;
                Ok((id, value))
            })
            .collect()
    }

    /// Parse and resolve a joint query.
    pub fn parse_joint(&self, query: &str) -> Result<IndexedAssignment> {
        let assignment = self.parse_assignments(query)?;
        self.resolve(query, &assignment)
    }

    /// Parse and resolve `P(V=v|E1=e1,...)`.
    ///
    /// Exactly one query variable is required and it must not also appear as
    /// evidence. The evidence list may be empty.
    pub fn parse_conditional(&self, query: &str) -> Result<ConditionalQuery> {
        let (query_part, evidence_part) = split_conditional(query)?;

        let target = parse_pairs(query, query_part)?;
        if target.len() != 1 {
            return Err(BnError::malformed(
                query,
                format!("expected exactly one query variable, found {}", target.len()),
            ));
        }
        let target = self.resolve(query, &target)?;
        let (&variable, &value) = target
            .iter()
            .next()
            .ok_or_else(|| BnError::malformed(query, "missing query variable"))?;

        let evidence = self.resolve(query, &parse_pairs(query, evidence_part)?)?;
        if evidence.contains_key(&variable) {
            return Err(BnError::malformed(
                query,
                "query variable also appears as evidence",
            ));
        }

        Ok(ConditionalQuery {
            variable,
            value,
            evidence,
        })
    }

    /// True when the query is `P(V=v | evidence)` and the evidence names
    /// exactly the parents of `V`, so the answer is a single CPT entry.
    pub fn is_directly_in_cpt(&self, query: &str) -> bool {
        self.parse_conditional(query)
            .map(|q| self.is_cpt_entry(&q))
            .unwrap_or(false)
    }

    pub(crate) fn is_cpt_entry(&self, query: &ConditionalQuery) -> bool {
        let parents = self.network.parents(query.variable);
        parents.len() == query.evidence.len()
            && parents.iter().all(|p| query.evidence.contains_key(p))
    }

    /// Every full assignment to `vars`, first variable outermost.
    ///
    /// Lazy: the product is never materialized, but its length is still
    /// exponential in `vars.len()`.
    pub fn generate_all_assignments(
        &self,
        vars: &[VarId],
    ) -> impl Iterator<Item = Assignment> + 'a {
        let network = self.network;
        let vars = vars.to_vec();
        self.indexed_assignments(&vars).map(move |coords| {
            vars.iter()
                .zip(coords)
                .map(|(&var, value)| {
                    let variable = network.variable(var);
                    let label = variable.outcome(value).unwrap_or_default().to_string();
                    (variable.name().to_string(), label)
                })
                .collect()
        })
    }

    /// Coordinate vectors over `vars`, aligned with `vars`.
    pub fn indexed_assignments(&self, vars: &[VarId]) -> CartesianProduct {
        CartesianProduct::new(
            vars.iter()
                .map(|&v| self.network.variables().cardinality(v))
                .collect(),
        )
    }
}

/// Body of `P(...)`.
fn strip_wrapper(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("P(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| BnError::malformed(text, "expected P(...)"))
}

/// Split `P(query|evidence)` into its two bodies.
fn split_conditional(text: &str) -> Result<(&str, &str)> {
    let body = strip_wrapper(text)?;
    let mut parts = body.split('|');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(query), Some(evidence), None) => Ok((query, evidence)),
        (_, None, _) => Err(BnError::malformed(text, "conditional query requires '|'")),
        _ => Err(BnError::malformed(text, "more than one '|'")),
    }
}

fn parse_pairs(query: &str, body: &str) -> Result<Assignment> {
    let mut assignment = Assignment::new();
    if body.trim().is_empty() {
        return Ok(assignment);
    }

    for pair in body.split(',') {
        let parts: Vec<&str> = pair.split('=').collect();
        let [name, value] = parts.as_slice() else {
            return Err(BnError::malformed(
                query,
                format!("'{}' is not of the form VAR=value", pair.trim()),
            ));
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            return Err(BnError::malformed(
                query,
                format!("'{}' has an empty name or value", pair.trim()),
            ));
        }
        if assignment
            .insert(name.to_string(), value.to_string())
            .is_some()
        {
            return Err(BnError::malformed(
                query,
                format!("variable {} assigned twice", name),
            ));
        }
    }

    Ok(assignment)
}
