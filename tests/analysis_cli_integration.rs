use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

struct TestInput {
    path: PathBuf,
}

impl TestInput {
    fn new(name: &str, content: &str) -> Self {
        let path = unique_temp_path(name);
        fs::write(&path, content).expect("write dependency input file");
        Self { path }
    }

    fn run(&self, args: &[&str]) -> serde_json::Value {
        let output = self.command(args).output().expect("run depgraph");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        assert!(
            output.status.success(),
            "depgraph {} failed\nstdout:\n{stdout}\nstderr:\n{stderr}",
            args.join(" ")
        );
        serde_json::from_slice(&output.stdout).expect("parse json output")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(depgraph_bin());
        cmd.arg("--file").arg(&self.path).args(args);
        cmd
    }
}

impl Drop for TestInput {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn depgraph_bin() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_depgraph") {
        return PathBuf::from(path);
    }

    let current_exe = std::env::current_exe().expect("resolve current test binary path");
    let target_dir = current_exe
        .parent()
        .and_then(|path| path.parent())
        .expect("derive cargo target dir from test binary path");
    let bin_name = if cfg!(windows) {
        "depgraph.exe"
    } else {
        "depgraph"
    };
    let fallback = target_dir.join(bin_name);

    if fallback.is_file() {
        fallback
    } else {
        panic!(
            "CARGO_BIN_EXE_depgraph is not set and fallback binary not found at {}",
            fallback.display()
        );
    }
}

fn unique_temp_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("depgraph-{prefix}-{pid}-{nanos}.txt"))
}

const CHAIN: &str = "app lib\nlib core\ncore\n";
const DIAMOND: &str = "A B C\nB D\nC D\n";
const CYCLIC: &str = "A B\nB C\nC A\nD A\n";

#[test]
fn check_reports_acyclic_graph() {
    let input = TestInput::new("check-acyclic", CHAIN);
    let value = input.run(&["check", "--json"]);
    assert_eq!(value, serde_json::json!({ "cycle": false }));
}

#[test]
fn check_reports_cycle() {
    let input = TestInput::new("check-cyclic", CYCLIC);
    let value = input.run(&["check", "--json"]);
    assert_eq!(value, serde_json::json!({ "cycle": true }));
}

#[test]
fn order_is_dependency_first() {
    let input = TestInput::new("order-chain", CHAIN);
    let value = input.run(&["order", "--json"]);
    assert_eq!(value, serde_json::json!(["core", "lib", "app"]));
}

#[test]
fn sccs_lists_multi_member_components() {
    let input = TestInput::new("sccs", CYCLIC);
    let value = input.run(&["sccs", "--json"]);
    let components = value.as_array().expect("array of components");
    assert_eq!(components.len(), 1);
    let mut members: Vec<String> = components[0]
        .as_array()
        .expect("component members")
        .iter()
        .map(|member| member.as_str().expect("member name").to_string())
        .collect();
    members.sort();
    assert_eq!(members, vec!["A", "B", "C"]);
}

#[test]
fn critical_reports_max_in_degree_and_table() {
    let input = TestInput::new("critical", DIAMOND);
    let value = input.run(&["critical", "--json"]);
    assert_eq!(
        value,
        serde_json::json!({
            "packages": ["D"],
            "max_dependents": 2,
            "in_degrees": { "A": 0, "B": 1, "C": 1, "D": 2 },
        })
    );
}

#[test]
fn deps_lists_transitive_dependencies_sorted() {
    let input = TestInput::new("deps", DIAMOND);
    let value = input.run(&["deps", "A", "--json"]);
    assert_eq!(value, serde_json::json!(["B", "C", "D"]));
}

#[test]
fn impact_lists_transitive_dependents_sorted() {
    let input = TestInput::new("impact", DIAMOND);
    let value = input.run(&["impact", "D", "--json"]);
    assert_eq!(value, serde_json::json!(["A", "B", "C"]));
}

#[test]
fn unknown_package_fails_with_error() {
    let input = TestInput::new("unknown", CHAIN);
    let output = input
        .command(&["deps", "ghost"])
        .output()
        .expect("run depgraph");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown package"), "stderr: {stderr}");
}

#[test]
fn missing_input_file_fails_with_error() {
    let missing = unique_temp_path("missing");
    let output = Command::new(depgraph_bin())
        .arg("--file")
        .arg(&missing)
        .arg("check")
        .output()
        .expect("run depgraph");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input file not found"), "stderr: {stderr}");
}
