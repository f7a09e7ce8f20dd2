//! # CLI Command Implementations

use idiomatch::loader::validate_output_path;
use idiomatch::{CheckReport, SearchReport, StoreSummary, load_manifest, load_store};
use idiomatch_core::{IdiomError, store_to_bytes, store_to_json};
use std::path::Path;

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), IdiomError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| IdiomError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Summarize the store.
pub fn cmd_inspect(store_path: &Path, json_mode: bool) -> Result<(), IdiomError> {
    let store = load_store(store_path)?;
    let summary = StoreSummary::from_store(&store);

    if json_mode {
        return print_json(&summary);
    }

    println!("Store Summary");
    println!("=============");
    println!("Store: {:?}", store_path);
    println!("Nodes: {}", summary.nodes);
    println!();
    println!("Relations:");
    for relation in &summary.relations {
        println!(
            "  {:<20} ranks={} edges={} sources={} sinks={}",
            relation.name, relation.ranks, relation.edges, relation.sources, relation.sinks
        );
    }
    println!("Predicates:");
    for predicate in &summary.predicates {
        println!("  {:<20} members={}", predicate.name, predicate.members);
    }

    Ok(())
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Search the store for matches of a pattern manifest.
pub fn cmd_search(
    store_path: &Path,
    pattern_path: &Path,
    max_solutions: Option<usize>,
    labels: bool,
    json_mode: bool,
) -> Result<(), IdiomError> {
    let store = load_store(store_path)?;
    let manifest = load_manifest(pattern_path)?;
    let report = SearchReport::run(&manifest, &store, max_solutions, labels)?;

    if json_mode {
        return print_json(&report);
    }

    println!("Pattern: {}", report.pattern);
    for (index, solution) in report.solutions.iter().enumerate() {
        println!("--- solution {} ---", index + 1);
        println!("{:#}", solution);
    }
    println!();
    println!(
        "{} solution(s){}",
        report.solutions.len(),
        if report.truncated {
            " (cap reached)"
        } else {
            ""
        }
    );
    println!(
        "Fixations: {}  Backtracks: {}  Changes: {}",
        report.statistics.fixations, report.statistics.backtracks, report.statistics.changes
    );

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate a pattern manifest against the store.
pub fn cmd_check(store_path: &Path, pattern_path: &Path, json_mode: bool) -> Result<(), IdiomError> {
    let store = load_store(store_path)?;
    let manifest = load_manifest(pattern_path)?;
    let report = CheckReport::run(&manifest, &store);

    if json_mode {
        print_json(&report)?;
    } else if report.valid {
        println!(
            "Pattern '{}' is valid ({} variables, {} constraints)",
            report.pattern, report.variables, report.constraints
        );
    }

    match report.error {
        Some(error) => Err(IdiomError::SerializationError(format!(
            "Pattern '{}' is invalid: {}",
            report.pattern, error
        ))),
        None => Ok(()),
    }
}

// =============================================================================
// PACK / UNPACK COMMANDS
// =============================================================================

/// Write the store in the packed binary format.
pub fn cmd_pack(store_path: &Path, output: &Path) -> Result<(), IdiomError> {
    let validated_output = validate_output_path(output)?;
    let store = load_store(store_path)?;
    let data = store_to_bytes(&store)?;

    std::fs::write(&validated_output, &data)
        .map_err(|e| IdiomError::IoError(format!("Write file: {}", e)))?;

    println!("Packed {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

/// Write the store as JSON.
pub fn cmd_unpack(store_path: &Path, output: &Path) -> Result<(), IdiomError> {
    let validated_output = validate_output_path(output)?;
    let store = load_store(store_path)?;
    let text = store_to_json(&store)?;

    std::fs::write(&validated_output, text.as_bytes())
        .map_err(|e| IdiomError::IoError(format!("Write file: {}", e)))?;

    println!("Wrote {} bytes to {:?}", text.len(), validated_output);
    Ok(())
}
