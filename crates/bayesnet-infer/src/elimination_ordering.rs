//! Elimination ordering heuristics for variable elimination.
//!
//! The order in which hidden variables are summed out does not change the
//! answer, only the size of the intermediate factors. All heuristics here are
//! greedy and deterministic: ties are broken by variable name.

use std::collections::{BTreeMap, BTreeSet};

use crate::variable::{VarId, VariableRegistry};

/// Strategy for computing variable elimination ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EliminationStrategy {
    /// Hidden variables sorted by name.
    #[default]
    Lexicographic,
    /// Min-weight: choose the variable whose elimination touches factors with
    /// the smallest product of domain sizes.
    MinWeight,
    /// Min-degree: choose the variable with the fewest neighbors.
    MinDegree,
    /// Min-fill: choose the variable that introduces the fewest new edges.
    MinFill,
}

/// Compute elimination ordering for variable elimination.
pub struct EliminationOrdering<'a> {
    strategy: EliminationStrategy,
    registry: &'a VariableRegistry,
}

type Adjacency = BTreeMap<VarId, BTreeSet<VarId>>;

impl<'a> EliminationOrdering<'a> {
    /// Create with a specific strategy.
    pub fn new(strategy: EliminationStrategy, registry: &'a VariableRegistry) -> Self {
        Self { strategy, registry }
    }

    /// Compute elimination order for `vars`, given the scopes of the factors
    /// they will be eliminated from. The scopes are only simulated; no
    /// arithmetic is done.
    pub fn compute_order(&self, scopes: &[Vec<VarId>], vars: &[VarId]) -> Vec<VarId> {
        match self.strategy {
            EliminationStrategy::Lexicographic => self.lexicographic_order(vars),
            EliminationStrategy::MinWeight => self.min_weight_order(scopes, vars),
            EliminationStrategy::MinDegree => self.min_degree_order(scopes, vars),
            EliminationStrategy::MinFill => self.min_fill_order(scopes, vars),
        }
    }

    fn lexicographic_order(&self, vars: &[VarId]) -> Vec<VarId> {
        let mut order = vars.to_vec();
        order.sort_by(|a, b| self.registry.name(*a).cmp(self.registry.name(*b)));
        order
    }

    /// Min-weight heuristic.
    ///
    /// After each choice the factors mentioning the chosen variable are
    /// replaced by the scope their product would have once it is summed out.
    fn min_weight_order(&self, scopes: &[Vec<VarId>], vars: &[VarId]) -> Vec<VarId> {
        let mut scopes: Vec<BTreeSet<VarId>> =
            scopes.iter().map(|s| s.iter().copied().collect()).collect();
        let mut remaining = self.lexicographic_order(vars);
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_weight = u64::MAX;
            // strict comparison keeps the lexicographically first on ties
            for (i, &var) in remaining.iter().enumerate() {
                let weight = self.elimination_weight(&scopes, var);
                if weight < best_weight {
                    best_weight = weight;
                    best = i;
                }
            }

            let var = remaining.remove(best);
            order.push(var);

            let (relevant, mut rest): (Vec<_>, Vec<_>) =
                scopes.into_iter().partition(|s| s.contains(&var));
            let mut merged: BTreeSet<VarId> = relevant.into_iter().flatten().collect();
            merged.remove(&var);
            if !merged.is_empty() {
                rest.push(merged);
            }
            scopes = rest;
        }

        order
    }

    /// Product of domain sizes over every variable in the factors that
    /// mention `var`; 0 when no factor mentions it.
    fn elimination_weight(&self, scopes: &[BTreeSet<VarId>], var: VarId) -> u64 {
        let involved: BTreeSet<VarId> = scopes
            .iter()
            .filter(|s| s.contains(&var))
            .flatten()
            .copied()
            .collect();

        if involved.is_empty() {
            return 0;
        }

        involved.iter().fold(1u64, |weight, &v| {
            weight.saturating_mul(self.registry.cardinality(v) as u64)
        })
    }

    /// Min-degree heuristic: Choose variable with fewest neighbors.
    fn min_degree_order(&self, scopes: &[Vec<VarId>], vars: &[VarId]) -> Vec<VarId> {
        self.greedy_graph_order(scopes, vars, |adjacency, var| {
            adjacency.get(&var).map_or(0, BTreeSet::len)
        })
    }

    /// Min-fill heuristic: Choose variable that introduces fewest new edges.
    ///
    /// When a variable is eliminated, its neighbors become fully connected.
    fn min_fill_order(&self, scopes: &[Vec<VarId>], vars: &[VarId]) -> Vec<VarId> {
        self.greedy_graph_order(scopes, vars, compute_fill)
    }

    fn greedy_graph_order<F>(&self, scopes: &[Vec<VarId>], vars: &[VarId], score: F) -> Vec<VarId>
    where
        F: Fn(&Adjacency, VarId) -> usize,
    {
        let mut remaining = self.lexicographic_order(vars);
        let mut order = Vec::with_capacity(remaining.len());
        let mut adjacency = build_adjacency_graph(scopes);

        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_score = usize::MAX;
            for (i, &var) in remaining.iter().enumerate() {
                let s = score(&adjacency, var);
                if s < best_score {
                    best_score = s;
                    best = i;
                }
            }

            let var = remaining.remove(best);
            order.push(var);
            update_adjacency_after_elimination(&mut adjacency, var);
        }

        order
    }
}

/// Interaction graph: two variables are adjacent when some factor mentions both.
fn build_adjacency_graph(scopes: &[Vec<VarId>]) -> Adjacency {
    let mut adjacency = Adjacency::new();
    for scope in scopes {
        for (i, &v1) in scope.iter().enumerate() {
            adjacency.entry(v1).or_default();
            for &v2 in &scope[i + 1..] {
                adjacency.entry(v1).or_default().insert(v2);
                adjacency.entry(v2).or_default().insert(v1);
            }
        }
    }
    adjacency
}

/// Number of edges eliminating `var` would add between its neighbors.
fn compute_fill(adjacency: &Adjacency, var: VarId) -> usize {
    let Some(neighbors) = adjacency.get(&var) else {
        return 0;
    };

    let neighbors: Vec<VarId> = neighbors.iter().copied().collect();
    let mut fill = 0;
    for (i, v1) in neighbors.iter().enumerate() {
        for v2 in &neighbors[i + 1..] {
            if !adjacency.get(v1).is_some_and(|adj| adj.contains(v2)) {
                fill += 1;
            }
        }
    }
    fill
}

/// Remove `var` and connect all pairs of its former neighbors.
fn update_adjacency_after_elimination(adjacency: &mut Adjacency, var: VarId) {
    let Some(neighbors) = adjacency.remove(&var) else {
        return;
    };

    for neighbor in &neighbors {
        if let Some(adj) = adjacency.get_mut(neighbor) {
            adj.remove(&var);
        }
    }

    let neighbors: Vec<VarId> = neighbors.into_iter().collect();
    for (i, &v1) in neighbors.iter().enumerate() {
        for &v2 in &neighbors[i + 1..] {
            adjacency.entry(v1).or_default().insert(v2);
            adjacency.entry(v2).or_default().insert(v1);
        }
    }
}
