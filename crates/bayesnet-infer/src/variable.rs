//! Discrete random variables and the arena that owns them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{BnError, Result};

/// Index of a variable inside a [`VariableRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named discrete random variable with an ordered domain of outcomes.
///
/// An outcome's position in the domain is its canonical index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    outcomes: Vec<String>,
}

impl Variable {
    /// Create a variable, rejecting an empty domain or repeated labels.
    pub fn new(name: impl Into<String>, outcomes: Vec<String>) -> Result<Self> {
        let name = name.into();
        if outcomes.is_empty() {
            return Err(BnError::InvalidNetwork(format!(
                "variable {} has no outcomes",
                name
            )));
        }
        for (i, outcome) in outcomes.iter().enumerate() {
            if outcomes[..i].contains(outcome) {
                return Err(BnError::InvalidNetwork(format!(
                    "variable {} lists outcome {} twice",
                    name, outcome
                )));
            }
        }
        Ok(Self { name, outcomes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// Domain size.
    pub fn cardinality(&self) -> usize {
        self.outcomes.len()
    }

    /// Canonical index of `outcome`, if it belongs to the domain.
    pub fn index_of(&self, outcome: &str) -> Option<usize> {
        self.outcomes.iter().position(|o| o == outcome)
    }

    pub fn outcome(&self, index: usize) -> Option<&str> {
        self.outcomes.get(index).map(String::as_str)
    }
}

/// Assignment at the text boundary: variable name to outcome label.
///
/// A `BTreeMap` so that rendering is deterministic.
pub type Assignment = BTreeMap<String, String>;

/// Assignment inside the engine: variable id to outcome index.
pub type IndexedAssignment = BTreeMap<VarId, usize>;

/// Immutable arena of variables addressed by [`VarId`].
#[derive(Clone, Debug, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    by_name: HashMap<String, VarId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable; names must be unique.
    pub fn insert(&mut self, variable: Variable) -> Result<VarId> {
        if self.by_name.contains_key(variable.name()) {
            return Err(BnError::InvalidNetwork(format!(
                "variable {} declared twice",
                variable.name()
            )));
        }
        let id = VarId(self.variables.len());
        self.by_name.insert(variable.name().to_string(), id);
        self.variables.push(variable);
        Ok(id)
    }

    pub fn id(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    /// The variable behind `id`. Ids are only minted by this registry, so an
    /// id from another registry is a caller bug.
    pub fn get(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&Variable> {
        self.id(name).map(|id| self.get(id))
    }

    pub fn name(&self, id: VarId) -> &str {
        self.get(id).name()
    }

    pub fn cardinality(&self, id: VarId) -> usize {
        self.get(id).cardinality()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// All ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.variables.len()).map(VarId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VarId(i), v))
    }

    /// Render an indexed assignment with names and labels.
    pub fn label(&self, assignment: &IndexedAssignment) -> Assignment {
        assignment
            .iter()
            .map(|(&id, &value)| {
                let var = self.get(id);
                let label = var.outcome(value).unwrap_or("?").to_string();
                (var.name().to_string(), label)
            })
            .collect()
    }
}
