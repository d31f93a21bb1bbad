use std::fs;
use std::path::Path;

use crate::core::package::PackageId;
use crate::error::{DepgraphError, Result};
use crate::graph::DependencyGraph;

pub fn load_file(path: &Path) -> Result<DependencyGraph> {
    if !path.is_file() {
        return Err(DepgraphError::InputNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_graph(&content))
}

// One package per line: the first token is the package, the remaining
// tokens are its direct dependencies. Blank lines carry no tokens and are
// skipped; any other label is opaque. A package listed without
// dependencies is still registered as a node.
pub fn parse_graph(content: &str) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for line in content.lines() {
        let mut tokens = line.split_whitespace();
        let Some(source) = tokens.next() else {
            continue;
        };
        let source = PackageId::new(source);
        graph.add_package(source.clone());
        for dependency in tokens {
            graph.add_edge(source.clone(), PackageId::new(dependency));
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::error::DepgraphError;

    fn unique_temp_file(prefix: &str, content: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        let path = std::env::temp_dir().join(format!("depgraph-{prefix}-{pid}-{nanos}.txt"));
        fs::write(&path, content).expect("write temp input file");
        path
    }

    #[test]
    fn parse_graph_builds_adjacency_in_input_order() {
        let graph = parse_graph("app lib util\nlib core\n");
        let packages: Vec<&str> = graph.packages().map(PackageId::as_str).collect();
        assert_eq!(packages, vec!["app", "lib", "util", "core"]);
        let deps: Vec<&str> = graph
            .dependencies_of(&PackageId::new("app"))
            .iter()
            .map(PackageId::as_str)
            .collect();
        assert_eq!(deps, vec!["lib", "util"]);
    }

    #[test]
    fn parse_graph_registers_destinations_as_nodes() {
        let graph = parse_graph("app lib\n");
        let lib = PackageId::new("lib");
        assert!(graph.contains(&lib));
        assert!(graph.dependencies_of(&lib).is_empty());
    }

    #[test]
    fn parse_graph_registers_bare_package_lines() {
        let graph = parse_graph("standalone\n");
        let standalone = PackageId::new("standalone");
        assert!(graph.contains(&standalone));
        assert!(graph.dependencies_of(&standalone).is_empty());
    }

    #[test]
    fn parse_graph_skips_blank_lines_and_keeps_duplicate_edges() {
        let graph = parse_graph("app lib\n\n   \napp lib\n");
        assert_eq!(graph.package_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn load_file_reads_whitespace_separated_lines() {
        let path = unique_temp_file("load", "app lib\nlib core\ncore\n");
        let graph = load_file(&path).expect("load graph");
        assert_eq!(graph.package_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_file_reports_missing_input() {
        let missing = std::env::temp_dir().join("depgraph-does-not-exist.txt");
        let err = load_file(&missing).expect_err("missing file should fail");
        assert!(matches!(err, DepgraphError::InputNotFound(_)));
    }
}
