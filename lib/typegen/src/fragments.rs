use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::{
    algo::is_cyclic_directed,
    graph::NodeIndex,
    visit::{Dfs, DfsPostOrder},
    Directed, Graph as Petgraph,
};
use tracing::{debug, instrument, trace};

use crate::ast::{document::Document, fragment::FragmentDefinition};

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FragmentError {
    #[error("Fragment '{fragment_name}' is defined more than once with different selections")]
    DuplicatedFragment { fragment_name: String },
}

/// Edges point from a fragment to the fragments it spreads.
type DependencyGraph = Petgraph<String, (), Directed>;

/// Every fragment of a document corpus, deduplicated by name, plus the graph of spreads between
/// them. The graph may be cyclic.
#[derive(Debug, Default, Clone)]
pub struct FragmentRegistry {
    fragments: IndexMap<String, FragmentDefinition>,
    graph: DependencyGraph,
    nodes: HashMap<String, NodeIndex>,
}

impl FragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: &[Document]) -> Result<Self, FragmentError> {
        let mut registry = Self::new();
        for document in documents {
            registry.register_document(document)?;
        }

        Ok(registry)
    }

    pub fn register_document(&mut self, document: &Document) -> Result<(), FragmentError> {
        for fragment in &document.fragments {
            self.register(fragment.clone())?;
        }

        Ok(())
    }

    /// Registering the same printed definition twice is a no-op; a different definition under
    /// a known name is a conflict.
    #[instrument(level = "trace", skip(self, fragment), fields(fragment_name = fragment.name))]
    pub fn register(&mut self, fragment: FragmentDefinition) -> Result<(), FragmentError> {
        if let Some(existing) = self.fragments.get(&fragment.name) {
            if existing.to_string() == fragment.to_string() {
                debug!("identical fragment already registered, skipping");
                return Ok(());
            }

            return Err(FragmentError::DuplicatedFragment {
                fragment_name: fragment.name,
            });
        }

        let node = self.node_for(&fragment.name);
        let dependencies: Vec<String> = fragment
            .dependencies()
            .into_iter()
            .map(str::to_string)
            .collect();

        for dependency in &dependencies {
            let dependency_node = self.node_for(dependency);
            self.graph.update_edge(node, dependency_node, ());
        }

        trace!(dependencies = dependencies.len(), "fragment registered");
        self.fragments.insert(fragment.name.clone(), fragment);

        Ok(())
    }

    fn node_for(&mut self, name: &str) -> NodeIndex {
        if let Some(node) = self.nodes.get(name) {
            return *node;
        }

        let node = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), node);
        node
    }

    pub fn resolve(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments.get(name)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Registered fragments in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.fragments.values()
    }

    /// Fragments spread directly by `name`, in document order.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.resolve(name)
            .map(|fragment| fragment.dependencies())
            .unwrap_or_default()
    }

    /// Every fragment reachable from `name` through spreads, `name` itself excluded.
    pub fn transitive_dependencies(&self, name: &str) -> Vec<&str> {
        let Some(start) = self.nodes.get(name) else {
            return vec![];
        };

        let mut dfs = Dfs::new(&self.graph, *start);
        let mut result = vec![];
        while let Some(node) = dfs.next(&self.graph) {
            if node != *start {
                result.push(self.graph[node].as_str());
            }
        }

        result
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Registered fragment names with dependencies before dependents. On a cycle the back-edge
    /// is cut where the walk first meets it, so every name still appears exactly once.
    #[instrument(level = "trace", skip(self), fields(fragments_count = self.fragments.len()))]
    pub fn emission_order(&self) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.fragments.len());
        let mut dfs = DfsPostOrder::empty(&self.graph);

        for name in self.fragments.keys() {
            let Some(start) = self.nodes.get(name) else {
                continue;
            };

            if dfs.finished.contains(start.index()) {
                continue;
            }

            dfs.move_to(*start);
            while let Some(node) = dfs.next(&self.graph) {
                let node_name = self.graph[node].as_str();
                // Spreads of unknown fragments are nodes too, but nothing to emit.
                if self.fragments.contains_key(node_name) {
                    order.push(node_name);
                }
            }
        }

        if self.has_cycles() {
            debug!("fragment dependency graph is cyclic, back-edges were cut");
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragments(source: &str) -> Vec<FragmentDefinition> {
        let document = graphql_parser::parse_query::<String>(source).unwrap();
        Document::from(&document).fragments
    }

    fn registry(source: &str) -> FragmentRegistry {
        let mut registry = FragmentRegistry::new();
        for fragment in fragments(source) {
            registry.register(fragment).unwrap();
        }
        registry
    }

    #[test]
    fn orders_dependencies_first() {
        let registry = registry(
            r#"
            fragment Outer on Query { ...Middle ...Leaf }
            fragment Middle on Query { ...Leaf a }
            fragment Leaf on Query { a }
            "#,
        );

        assert_eq!(registry.emission_order(), vec!["Leaf", "Middle", "Outer"]);
        assert_eq!(registry.dependencies_of("Outer"), vec!["Middle", "Leaf"]);
        assert_eq!(registry.transitive_dependencies("Outer"), vec!["Middle", "Leaf"]);
        assert!(!registry.has_cycles());
    }

    #[test]
    fn scans_inline_fragments_and_nested_fields_for_spreads() {
        let registry = registry(
            r#"
            fragment A on Query { node { ... on User { ...B } } }
            fragment B on User { id }
            "#,
        );

        assert_eq!(registry.dependencies_of("A"), vec!["B"]);
        assert_eq!(registry.emission_order(), vec!["B", "A"]);
    }

    #[test]
    fn identical_registration_is_idempotent() {
        let mut registry = registry("fragment F on Query { a }");
        let before: Vec<String> = registry
            .emission_order()
            .into_iter()
            .map(String::from)
            .collect();

        for fragment in fragments("fragment F on Query { a }") {
            registry.register(fragment).unwrap();
        }

        assert_eq!(registry.emission_order(), before);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_definition_under_same_name_conflicts() {
        let mut registry = registry("fragment F on Query { a }");
        let conflicting = fragments("fragment F on Query { b }").remove(0);

        assert_eq!(
            registry.register(conflicting),
            Err(FragmentError::DuplicatedFragment {
                fragment_name: "F".to_string()
            })
        );
    }

    #[test]
    fn tolerates_indirect_cycles() {
        let registry = registry(
            r#"
            fragment A on Query { ...C }
            fragment B on Query { ...A }
            fragment C on Query { ...B }
            "#,
        );

        assert!(registry.has_cycles());
        let order = registry.emission_order();
        assert_eq!(order.len(), 3);
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(registry.transitive_dependencies("A"), vec!["C", "B"]);
    }

    #[test]
    fn skips_unregistered_spreads() {
        let registry = registry("fragment A on Query { ...Missing a }");
        assert_eq!(registry.emission_order(), vec!["A"]);
        assert!(registry.resolve("Missing").is_none());
    }
}
