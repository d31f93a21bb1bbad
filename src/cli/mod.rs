use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dialoguer::{Input, Select};
use serde_json::json;

use crate::core::package::PackageId;
use crate::error::{DepgraphError, Result};
use crate::graph::builder;
use crate::graph::ops::{
    affected_by_removal, critical_packages, find_sccs, has_cycle, install_order,
    transitive_dependencies,
};
use crate::graph::DependencyGraph;
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "depgraph")]
#[command(about = "Package dependency graph analyzer", long_about = None)]
pub struct Cli {
    #[arg(short, long, env = "DEPGRAPH_FILE")]
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Check(CheckArgs),
    Sccs(SccsArgs),
    Order(OrderArgs),
    Critical(CriticalArgs),
    Deps(DepsArgs),
    Impact(ImpactArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SccsArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CriticalArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    pub package: String,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImpactArgs {
    pub package: String,
    #[arg(long)]
    pub json: bool,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
    }
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Some(command) => {
            let graph = load_graph(cli.file, false)?;
            match command {
                Commands::Check(args) => handle_check(args, &graph),
                Commands::Sccs(args) => handle_sccs(args, &graph),
                Commands::Order(args) => handle_order(args, &graph),
                Commands::Critical(args) => handle_critical(args, &graph),
                Commands::Deps(args) => handle_deps(args, &graph),
                Commands::Impact(args) => handle_impact(args, &graph),
            }
        }
        None => {
            let graph = load_graph(cli.file, true)?;
            run_menu(&graph)
        }
    }
}

fn load_graph(file: Option<PathBuf>, interactive: bool) -> Result<DependencyGraph> {
    let path = match file {
        Some(path) => path,
        None if interactive => {
            let input: String = Input::new()
                .with_prompt("Dependency file")
                .default("deps.txt".to_string())
                .interact_text()
                .map_err(prompt_error)?;
            PathBuf::from(input)
        }
        None => PathBuf::from("deps.txt"),
    };
    builder::load_file(&path)
}

fn handle_check(args: CheckArgs, graph: &DependencyGraph) -> Result<()> {
    let cyclic = has_cycle(graph);
    if args.json {
        println!("{}", json!({ "cycle": cyclic }));
    } else {
        println!("Cycle detected: {}", if cyclic { "yes" } else { "no" });
    }
    Ok(())
}

fn handle_sccs(args: SccsArgs, graph: &DependencyGraph) -> Result<()> {
    let components = find_sccs(graph);
    if args.json {
        let value: Vec<Vec<&str>> = components
            .iter()
            .map(|component| component.iter().map(PackageId::as_str).collect())
            .collect();
        println!("{}", json!(value));
    } else {
        print_sccs(&components);
    }
    Ok(())
}

fn handle_order(args: OrderArgs, graph: &DependencyGraph) -> Result<()> {
    let order = install_order(graph);
    if args.json {
        let value: Vec<&str> = order.iter().map(PackageId::as_str).collect();
        println!("{}", json!(value));
    } else {
        print_order(&order);
    }
    Ok(())
}

fn handle_critical(args: CriticalArgs, graph: &DependencyGraph) -> Result<()> {
    let report = critical_packages(graph);
    if args.json {
        let in_degrees: serde_json::Map<String, serde_json::Value> = report
            .in_degrees
            .iter()
            .map(|(package, &count)| (package.as_str().to_string(), json!(count)))
            .collect();
        let packages: Vec<&str> = report.packages.iter().map(PackageId::as_str).collect();
        println!(
            "{}",
            json!({
                "packages": packages,
                "max_dependents": report.max_dependents,
                "in_degrees": in_degrees,
            })
        );
    } else {
        print_critical(graph);
    }
    Ok(())
}

fn handle_deps(args: DepsArgs, graph: &DependencyGraph) -> Result<()> {
    let package = PackageId::new(args.package.clone());
    if !graph.contains(&package) {
        return Err(DepgraphError::UnknownPackage(args.package));
    }
    let deps = sorted_names(&transitive_dependencies(graph, &package));
    if args.json {
        println!("{}", json!(deps));
    } else {
        print_dependencies(&package, &deps);
    }
    Ok(())
}

fn handle_impact(args: ImpactArgs, graph: &DependencyGraph) -> Result<()> {
    let package = PackageId::new(args.package.clone());
    if !graph.contains(&package) {
        return Err(DepgraphError::UnknownPackage(args.package));
    }
    let affected = sorted_names(&affected_by_removal(graph, &package));
    if args.json {
        println!("{}", json!(affected));
    } else {
        print_impact(&package, &affected);
    }
    Ok(())
}

fn run_menu(graph: &DependencyGraph) -> Result<()> {
    let cyclic = has_cycle(graph);
    output::info(&format!(
        "Cycle detected: {}",
        if cyclic { "yes" } else { "no" }
    ));

    loop {
        // The first entry mirrors the graph's shape: SCCs only make sense on
        // a cyclic graph, an install order only on an acyclic one.
        let first = if cyclic {
            "List strongly connected components"
        } else {
            "Show install order"
        };
        let items = [
            first,
            "Show critical packages",
            "Query package dependencies",
            "Simulate package removal",
            "Quit",
        ];
        let choice = Select::new()
            .with_prompt("Choose an option")
            .items(&items)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        match choice {
            0 if cyclic => print_sccs(&find_sccs(graph)),
            0 => print_order(&install_order(graph)),
            1 => print_critical(graph),
            2 => query_dependencies(graph)?,
            3 => simulate_removal(graph)?,
            _ => break,
        }
    }
    Ok(())
}

fn query_dependencies(graph: &DependencyGraph) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Package to query")
        .interact_text()
        .map_err(prompt_error)?;
    let package = PackageId::new(name);
    if !graph.contains(&package) {
        output::warn("Package not found in graph.");
        return Ok(());
    }
    let deps = sorted_names(&transitive_dependencies(graph, &package));
    print_dependencies(&package, &deps);
    Ok(())
}

fn simulate_removal(graph: &DependencyGraph) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Package to remove")
        .interact_text()
        .map_err(prompt_error)?;
    let package = PackageId::new(name);
    if !graph.contains(&package) {
        output::warn("Package not found in graph.");
        return Ok(());
    }
    let affected = sorted_names(&affected_by_removal(graph, &package));
    print_impact(&package, &affected);
    Ok(())
}

fn print_sccs(components: &[Vec<PackageId>]) {
    if components.is_empty() {
        println!("No strongly connected components with more than one package.");
        return;
    }
    println!("Strongly connected components:");
    for (idx, component) in components.iter().enumerate() {
        let members: Vec<&str> = component.iter().map(PackageId::as_str).collect();
        println!("  SCC {}: {}", idx + 1, members.join(", "));
    }
}

fn print_order(order: &[PackageId]) {
    let names: Vec<&str> = order.iter().map(PackageId::as_str).collect();
    println!("Suggested install order:");
    println!("  {}", names.join(" -> "));
}

fn print_critical(graph: &DependencyGraph) {
    let report = critical_packages(graph);
    let names: Vec<&str> = report.packages.iter().map(PackageId::as_str).collect();
    println!(
        "Packages with the most dependents ({}): {}",
        report.max_dependents,
        names.join(", ")
    );
}

fn print_dependencies(package: &PackageId, deps: &[String]) {
    if deps.is_empty() {
        println!("{} has no dependencies.", package);
    } else {
        println!(
            "Dependencies of {} (direct and transitive): {}",
            package,
            deps.join(", ")
        );
    }
}

fn print_impact(package: &PackageId, affected: &[String]) {
    if affected.is_empty() {
        println!("No package would be affected by removing {}.", package);
    } else {
        println!(
            "Packages affected by removing {}: {}",
            package,
            affected.join(", ")
        );
    }
}

fn sorted_names(packages: &HashSet<PackageId>) -> Vec<String> {
    let mut names: Vec<String> = packages
        .iter()
        .map(|package| package.as_str().to_string())
        .collect();
    names.sort();
    names
}

fn prompt_error(err: dialoguer::Error) -> DepgraphError {
    DepgraphError::Other(anyhow::Error::new(err))
}
