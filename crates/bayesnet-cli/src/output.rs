//! Result rendering and colored terminal output

use bayesnet_infer::{InferenceResult, NetworkStructure};
use colored::*;

/// Render one result line: `probability,additions,multiplications`.
pub fn format_result(result: &InferenceResult, precision: usize) -> String {
    format!(
        "{:.*},{},{}",
        precision, result.probability, result.additions, result.multiplications
    )
}

/// Render a failed query line.
pub fn format_failure(message: &str) -> String {
    format!("ERROR: {}", message)
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

pub fn print_header(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", "=".repeat(title.chars().count()).cyan());
}

/// Variables with their domains and parents, then the topological order.
pub fn print_network(network: &NetworkStructure) {
    let registry = network.variables();

    print_header("Variables");
    for (id, variable) in registry.iter() {
        let parents: Vec<&str> = network
            .parents(id)
            .iter()
            .map(|&p| registry.name(p))
            .collect();
        println!(
            "  {} {{{}}}  parents: [{}]",
            variable.name().green().bold(),
            variable.outcomes().join(", "),
            parents.join(", ").yellow()
        );
    }

    print_header("Topological order");
    let order: Vec<&str> = network
        .topological_order()
        .iter()
        .map(|&v| registry.name(v))
        .collect();
    println!("  {}", order.join(" -> "));
}

pub fn enable_colors(enabled: bool) {
    colored::control::set_override(enabled);
}
