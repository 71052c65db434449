//! Network structure: variables, CPTs, adjacency, and topological order.
//!
//! A [`NetworkStructure`] is built once through a [`NetworkBuilder`] and is
//! read-only afterwards, so it can be shared across concurrent queries.

use std::collections::HashSet;

use crate::cpt::Cpt;
use crate::error::{BnError, Result};
use crate::variable::{VarId, Variable, VariableRegistry};

/// Unresolved CPT definition as supplied by a network reader.
#[derive(Clone, Debug, PartialEq)]
pub struct CptDefinition {
    pub variable: String,
    pub parents: Vec<String>,
    pub table: Vec<f64>,
}

/// Collects variables and CPT definitions by name, then resolves and
/// validates them in [`NetworkBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct NetworkBuilder {
    variables: Vec<(String, Vec<String>)>,
    definitions: Vec<CptDefinition>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable with its ordered outcomes.
    pub fn variable<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        outcomes: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.variables
            .push((name.into(), outcomes.into_iter().map(Into::into).collect()));
        self
    }

    /// Add the CPT P(`variable` | `parents`) with a table in CPT layout.
    pub fn cpt<S: Into<String>>(
        &mut self,
        variable: impl Into<String>,
        parents: impl IntoIterator<Item = S>,
        table: Vec<f64>,
    ) -> &mut Self {
        self.definitions.push(CptDefinition {
            variable: variable.into(),
            parents: parents.into_iter().map(Into::into).collect(),
            table,
        });
        self
    }

    pub fn definition(&mut self, definition: CptDefinition) -> &mut Self {
        self.definitions.push(definition);
        self
    }

    /// Resolve all references and compute the derived structure.
    pub fn build(&self) -> Result<NetworkStructure> {
        let mut registry = VariableRegistry::new();
        for (name, outcomes) in &self.variables {
            registry.insert(Variable::new(name.clone(), outcomes.clone())?)?;
        }

        let mut slots: Vec<Option<Cpt>> = vec![None; registry.len()];
        for def in &self.definitions {
            let variable = registry
                .id(&def.variable)
                .ok_or_else(|| BnError::UnresolvedReference {
                    cpt: def.variable.clone(),
                    name: def.variable.clone(),
                })?;

            let mut parents = Vec::with_capacity(def.parents.len());
            for parent in &def.parents {
                let id = registry
                    .id(parent)
                    .ok_or_else(|| BnError::UnresolvedReference {
                        cpt: def.variable.clone(),
                        name: parent.clone(),
                    })?;
                if parents.contains(&id) {
                    return Err(BnError::InvalidNetwork(format!(
                        "CPT for {} lists parent {} twice",
                        def.variable, parent
                    )));
                }
                parents.push(id);
            }

            if slots[variable.0].is_some() {
                return Err(BnError::InvalidNetwork(format!(
                    "variable {} has more than one CPT",
                    def.variable
                )));
            }
            slots[variable.0] = Some(Cpt::new(&registry, variable, parents, def.table.clone())?);
        }

        let mut cpts = Vec::with_capacity(slots.len());
        for (id, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(cpt) => cpts.push(cpt),
                None => {
                    return Err(BnError::InvalidNetwork(format!(
                        "variable {} has no CPT",
                        registry.name(VarId(id))
                    )))
                }
            }
        }

        NetworkStructure::new(registry, cpts)
    }
}

/// Owns all variables and CPTs of a Bayesian network.
#[derive(Clone, Debug)]
pub struct NetworkStructure {
    registry: VariableRegistry,
    /// Indexed by `VarId`.
    cpts: Vec<Cpt>,
    children: Vec<Vec<VarId>>,
    topological_order: Vec<VarId>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl NetworkStructure {
    /// Derive children and topological order. `cpts[i]` must be the CPT of
    /// `VarId(i)`.
    fn new(registry: VariableRegistry, cpts: Vec<Cpt>) -> Result<Self> {
        let mut children = vec![Vec::new(); registry.len()];
        for cpt in &cpts {
            for parent in cpt.parents() {
                children[parent.0].push(cpt.variable());
            }
        }

        let mut network = Self {
            registry,
            cpts,
            children,
            topological_order: Vec::new(),
        };
        network.topological_order = network.compute_topological_order()?;

        tracing::info!(
            variables = network.registry.len(),
            cpts = network.cpts.len(),
            "Bayesian network built"
        );
        Ok(network)
    }

    /// Depth-first search over children; the reverse of completion order
    /// places every variable after all of its ancestors.
    fn compute_topological_order(&self) -> Result<Vec<VarId>> {
        let mut marks = vec![Mark::Unvisited; self.registry.len()];
        let mut completed = Vec::with_capacity(self.registry.len());

        for var in self.registry.ids() {
            if marks[var.0] == Mark::Unvisited {
                self.visit(var, &mut marks, &mut completed)?;
            }
        }

        completed.reverse();
        Ok(completed)
    }

    fn visit(&self, var: VarId, marks: &mut [Mark], completed: &mut Vec<VarId>) -> Result<()> {
        match marks[var.0] {
            Mark::Done => return Ok(()),
            Mark::OnStack => {
                return Err(BnError::CyclicNetwork {
                    variable: self.registry.name(var).to_string(),
                })
            }
            Mark::Unvisited => {}
        }

        marks[var.0] = Mark::OnStack;
        for &child in &self.children[var.0] {
            self.visit(child, marks, completed)?;
        }
        marks[var.0] = Mark::Done;
        completed.push(var);
        Ok(())
    }

    pub fn topological_order(&self) -> &[VarId] {
        &self.topological_order
    }

    pub fn parents(&self, var: VarId) -> &[VarId] {
        self.cpts[var.0].parents()
    }

    pub fn children(&self, var: VarId) -> &[VarId] {
        &self.children[var.0]
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn variable(&self, var: VarId) -> &Variable {
        self.registry.get(var)
    }

    pub fn id(&self, name: &str) -> Option<VarId> {
        self.registry.id(name)
    }

    pub fn cpt(&self, var: VarId) -> &Cpt {
        &self.cpts[var.0]
    }

    pub fn cpts(&self) -> impl Iterator<Item = &Cpt> {
        self.cpts.iter()
    }

    pub fn num_variables(&self) -> usize {
        self.registry.len()
    }

    /// Variables outside `observed`, in declaration order.
    pub fn hidden_variables(&self, observed: &HashSet<VarId>) -> Vec<VarId> {
        self.registry
            .ids()
            .filter(|v| !observed.contains(v))
            .collect()
    }

    /// Whether `ancestor` precedes `descendant` in the topological order.
    pub fn precedes(&self, ancestor: VarId, descendant: VarId) -> bool {
        let pos = |v: VarId| self.topological_order.iter().position(|&x| x == v);
        matches!((pos(ancestor), pos(descendant)), (Some(a), Some(d)) if a < d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprinkler() -> NetworkStructure {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("WetGrass", ["T", "F"])
            .variable("Sprinkler", ["T", "F"])
            .variable("Rain", ["T", "F"])
            .variable("Cloudy", ["T", "F"])
            .cpt("Cloudy", Vec::<String>::new(), vec![0.5, 0.5])
            .cpt("Sprinkler", ["Cloudy"], vec![0.1, 0.9, 0.5, 0.5])
            .cpt("Rain", ["Cloudy"], vec![0.8, 0.2, 0.2, 0.8])
            .cpt(
                "WetGrass",
                ["Sprinkler", "Rain"],
                vec![0.99, 0.01, 0.9, 0.1, 0.9, 0.1, 0.0, 1.0],
            );
        builder.build().unwrap()
    }

    #[test]
    fn test_topological_order_parents_first() {
        let network = sprinkler();
        let order = network.topological_order();
        assert_eq!(order.len(), 4);

        for &var in order {
            for &parent in network.parents(var) {
                assert!(network.precedes(parent, var));
            }
        }
    }

    #[test]
    fn test_children_and_parents() {
        let network = sprinkler();
        let cloudy = network.id("Cloudy").unwrap();
        let wet = network.id("WetGrass").unwrap();

        let children: Vec<&str> = network
            .children(cloudy)
            .iter()
            .map(|&c| network.variables().name(c))
            .collect();
        assert_eq!(children, vec!["Sprinkler", "Rain"]);

        let parents: Vec<&str> = network
            .parents(wet)
            .iter()
            .map(|&p| network.variables().name(p))
            .collect();
        assert_eq!(parents, vec!["Sprinkler", "Rain"]);
        assert!(network.children(wet).is_empty());
    }

    #[test]
    fn test_cycle_detected_at_construction() {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("A", ["T", "F"])
            .variable("B", ["T", "F"])
            .cpt("A", ["B"], vec![0.5; 4])
            .cpt("B", ["A"], vec![0.5; 4]);

        assert!(matches!(builder.build(), Err(BnError::CyclicNetwork { .. })));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut builder = NetworkBuilder::new();
        builder.variable("A", ["T", "F"]).cpt("A", ["A"], vec![0.5; 4]);
        assert!(matches!(builder.build(), Err(BnError::CyclicNetwork { .. })));
    }

    #[test]
    fn test_unresolved_parent() {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("A", ["T", "F"])
            .cpt("A", ["Ghost"], vec![0.5; 4]);

        match builder.build() {
            Err(BnError::UnresolvedReference { cpt, name }) => {
                assert_eq!(cpt, "A");
                assert_eq!(name, "Ghost");
            }
            other => panic!("expected UnresolvedReference, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_cpt_variable() {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("A", ["T", "F"])
            .cpt("A", Vec::<String>::new(), vec![0.5, 0.5])
            .cpt("Ghost", Vec::<String>::new(), vec![0.5, 0.5]);
        assert!(matches!(
            builder.build(),
            Err(BnError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_missing_and_duplicate_cpts() {
        let mut missing = NetworkBuilder::new();
        missing.variable("A", ["T", "F"]);
        assert!(matches!(missing.build(), Err(BnError::InvalidNetwork(_))));

        let mut duplicate = NetworkBuilder::new();
        duplicate
            .variable("A", ["T", "F"])
            .cpt("A", Vec::<String>::new(), vec![0.5, 0.5])
            .cpt("A", Vec::<String>::new(), vec![0.5, 0.5]);
        assert!(matches!(duplicate.build(), Err(BnError::InvalidNetwork(_))));
    }

    #[test]
    fn test_table_size_checked() {
        let mut builder = NetworkBuilder::new();
        builder
            .variable("A", ["T", "F"])
            .variable("B", ["T", "F"])
            .cpt("A", Vec::<String>::new(), vec![0.5, 0.5])
            .cpt("B", ["A"], vec![0.5, 0.5]);
        assert!(matches!(
            builder.build(),
            Err(BnError::TableSizeMismatch { .. })
        ));
    }
}
