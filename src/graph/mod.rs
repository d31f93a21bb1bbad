use indexmap::IndexMap;

use crate::core::package::PackageId;

pub mod builder;
pub mod ops;

// Adjacency-list model: `source -> dependency` edges, duplicates kept,
// insertion order of nodes and of each neighbor list preserved. Every
// package that appears as an edge destination is also registered as a
// key, so traversals never need a presence check. Built once per
// session; every analysis in `ops` is a read-only query.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    pub edges: IndexMap<PackageId, Vec<PackageId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, package: PackageId) {
        self.edges.entry(package).or_default();
    }

    pub fn add_edge(&mut self, source: PackageId, dependency: PackageId) {
        self.edges
            .entry(source)
            .or_default()
            .push(dependency.clone());
        self.edges.entry(dependency).or_default();
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
        self.edges.keys()
    }

    pub fn dependencies_of(&self, package: &PackageId) -> &[PackageId] {
        self.edges
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, package: &PackageId) -> bool {
        self.edges.contains_key(package)
    }

    pub fn package_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn inverted(&self) -> DependencyGraph {
        let mut inverted = DependencyGraph::new();
        for package in self.packages() {
            inverted.add_package(package.clone());
        }
        for (source, dependencies) in &self.edges {
            for dependency in dependencies {
                inverted.add_edge(dependency.clone(), source.clone());
            }
        }
        inverted
    }
}
