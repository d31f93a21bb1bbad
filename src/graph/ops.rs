use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::core::package::PackageId;
use crate::graph::DependencyGraph;

// All walks below are iterative with explicit heap-allocated frames, so a
// long dependency chain cannot exhaust the native call stack.
struct WalkFrame {
    node: PackageId,
    next: usize,
}

impl WalkFrame {
    fn new(node: PackageId) -> Self {
        Self { node, next: 0 }
    }
}

pub fn has_cycle(graph: &DependencyGraph) -> bool {
    let mut visited: HashSet<PackageId> = HashSet::new();
    let mut on_path: HashSet<PackageId> = HashSet::new();

    for root in graph.packages() {
        if visited.contains(root) {
            continue;
        }
        visited.insert(root.clone());
        on_path.insert(root.clone());
        let mut frames = vec![WalkFrame::new(root.clone())];

        while let Some(frame) = frames.last_mut() {
            let deps = graph.dependencies_of(&frame.node);
            if frame.next == deps.len() {
                let node = frame.node.clone();
                frames.pop();
                on_path.remove(&node);
                continue;
            }
            let next = deps[frame.next].clone();
            frame.next += 1;
            if on_path.contains(&next) {
                return true;
            }
            if visited.insert(next.clone()) {
                on_path.insert(next.clone());
                frames.push(WalkFrame::new(next));
            }
        }
    }

    false
}

#[derive(Default)]
struct TarjanState {
    indices: HashMap<PackageId, usize>,
    lowlinks: HashMap<PackageId, usize>,
    stack: Vec<PackageId>,
    on_stack: HashSet<PackageId>,
    next_index: usize,
    components: Vec<Vec<PackageId>>,
}

impl TarjanState {
    fn discover(&mut self, node: PackageId) {
        self.indices.insert(node.clone(), self.next_index);
        self.lowlinks.insert(node.clone(), self.next_index);
        self.next_index += 1;
        self.stack.push(node.clone());
        self.on_stack.insert(node);
    }
}

// Only components with more than one member are returned. A package whose
// sole cycle is a self-loop forms a size-1 component and is not reported
// here, even though `has_cycle` flags it; the two analyses answer different
// questions and intentionally disagree on that case.
pub fn find_sccs(graph: &DependencyGraph) -> Vec<Vec<PackageId>> {
    let mut state = TarjanState::default();
    for root in graph.packages() {
        if state.indices.contains_key(root) {
            continue;
        }
        strong_connect(graph, root, &mut state);
    }
    state.components
}

fn strong_connect(graph: &DependencyGraph, root: &PackageId, state: &mut TarjanState) {
    state.discover(root.clone());
    let mut frames = vec![WalkFrame::new(root.clone())];

    while let Some(frame) = frames.last_mut() {
        let deps = graph.dependencies_of(&frame.node);
        if frame.next < deps.len() {
            let next = deps[frame.next].clone();
            frame.next += 1;
            if !state.indices.contains_key(&next) {
                state.discover(next.clone());
                frames.push(WalkFrame::new(next));
            } else if state.on_stack.contains(&next) {
                // Back or cross edge within the current component: lower the
                // low-link to the neighbor's discovery index, not its low-link.
                if let Some(&index) = state.indices.get(&next) {
                    if let Some(lowlink) = state.lowlinks.get_mut(&frame.node) {
                        if index < *lowlink {
                            *lowlink = index;
                        }
                    }
                }
            }
            continue;
        }

        let node = frame.node.clone();
        frames.pop();
        if let Some(parent) = frames.last() {
            if let Some(&lowlink) = state.lowlinks.get(&node) {
                if let Some(parent_lowlink) = state.lowlinks.get_mut(&parent.node) {
                    if lowlink < *parent_lowlink {
                        *parent_lowlink = lowlink;
                    }
                }
            }
        }

        if state.lowlinks.get(&node) == state.indices.get(&node) {
            let mut component = Vec::new();
            while let Some(member) = state.stack.pop() {
                state.on_stack.remove(&member);
                let is_root = member == node;
                component.push(member);
                if is_root {
                    break;
                }
            }
            if component.len() > 1 {
                state.components.push(component);
            }
        }
    }
}

// Postorder over `source -> dependency` edges already lists a package after
// everything it depends on, so the result is dependency-first: for every
// edge A -> B, B appears before A. That is the install order, no reversal.
// On a cyclic graph this still terminates and returns a permutation of the
// packages, but the order carries no topological guarantee; callers should
// check `has_cycle` first.
pub fn install_order(graph: &DependencyGraph) -> Vec<PackageId> {
    let mut visited: HashSet<PackageId> = HashSet::new();
    let mut order = Vec::new();

    for root in graph.packages() {
        if visited.contains(root) {
            continue;
        }
        visited.insert(root.clone());
        let mut frames = vec![WalkFrame::new(root.clone())];

        while let Some(frame) = frames.last_mut() {
            let deps = graph.dependencies_of(&frame.node);
            if frame.next == deps.len() {
                let node = frame.node.clone();
                frames.pop();
                order.push(node);
                continue;
            }
            let next = deps[frame.next].clone();
            frame.next += 1;
            if visited.insert(next.clone()) {
                frames.push(WalkFrame::new(next));
            }
        }
    }

    order
}

#[derive(Debug, Clone)]
pub struct CriticalPackages {
    pub packages: Vec<PackageId>,
    pub max_dependents: usize,
    pub in_degrees: IndexMap<PackageId, usize>,
}

pub fn critical_packages(graph: &DependencyGraph) -> CriticalPackages {
    let mut in_degrees: IndexMap<PackageId, usize> = IndexMap::new();
    for package in graph.packages() {
        in_degrees.entry(package.clone()).or_insert(0);
        for dependency in graph.dependencies_of(package) {
            in_degrees.entry(dependency.clone()).or_insert(0);
        }
    }
    for package in graph.packages() {
        for dependency in graph.dependencies_of(package) {
            if let Some(count) = in_degrees.get_mut(dependency) {
                *count += 1;
            }
        }
    }

    let max_dependents = in_degrees.values().copied().max().unwrap_or(0);
    let packages = in_degrees
        .iter()
        .filter(|(_, &count)| count == max_dependents)
        .map(|(package, _)| package.clone())
        .collect();

    CriticalPackages {
        packages,
        max_dependents,
        in_degrees,
    }
}

pub fn transitive_dependencies(graph: &DependencyGraph, package: &PackageId) -> HashSet<PackageId> {
    reachable_from(&graph.edges, package)
}

pub fn affected_by_removal(graph: &DependencyGraph, package: &PackageId) -> HashSet<PackageId> {
    let inverted = graph.inverted();
    reachable_from(&inverted.edges, package)
}

// The start node is not part of the result unless a cycle leads back to it.
fn reachable_from(
    edges: &IndexMap<PackageId, Vec<PackageId>>,
    start: &PackageId,
) -> HashSet<PackageId> {
    let mut seen: HashSet<PackageId> = HashSet::new();
    let mut stack: Vec<PackageId> = Vec::new();
    if let Some(deps) = edges.get(start) {
        stack.extend(deps.iter().cloned());
    }
    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if let Some(next) = edges.get(&current) {
            stack.extend(next.iter().cloned());
        }
    }
    seen
}
