//! The `scan` command: load units, run the engine, render the report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use kubeaudit_analysis::{Engine, RuleSelection};
use kubeaudit_analysis::rules::registry::DEFAULT_DISABLED;
use kubeaudit_core::load_units;

use crate::exit_codes::*;
use crate::output;

pub struct ScanArgs {
    pub paths: Vec<String>,
    /// Exclusive allow-list, comma separated.
    pub rules: Option<String>,
    /// Extra deny-list, comma separated.
    pub disable: Option<String>,
    /// Clear the default deny-list.
    pub all_rules: bool,
    pub json: bool,
}

fn split_ids(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the rule selection from CLI flags. A non-empty allow-list wins;
/// otherwise the default deny-list applies unless `--all-rules` clears it,
/// and `--disable` extends it.
pub fn build_selection(args: &ScanArgs) -> RuleSelection {
    if let Some(csv) = &args.rules {
        let allow = split_ids(csv);
        if !allow.is_empty() {
            return RuleSelection::allow_only(allow);
        }
    }
    let mut deny: Vec<String> = if args.all_rules {
        Vec::new()
    } else {
        DEFAULT_DISABLED.iter().map(|s| s.to_string()).collect()
    };
    if let Some(csv) = &args.disable {
        for id in split_ids(csv) {
            if !deny.contains(&id) {
                deny.push(id);
            }
        }
    }
    RuleSelection { allow: Vec::new(), deny }
}

pub async fn execute(args: ScanArgs) -> Result<i32> {
    let paths: Vec<PathBuf> = args.paths.iter().map(PathBuf::from).collect();

    let outcome = match load_units(&paths) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{e}");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    for diag in &outcome.skipped {
        warn!("skipped unit {}: {}", diag.dir, diag.reason);
    }
    info!(
        "loaded {} units ({} skipped)",
        outcome.units.len(),
        outcome.skipped.len()
    );

    let selection = build_selection(&args);
    let skipped = outcome.skipped;
    let units: Vec<Arc<_>> = outcome.units.into_iter().map(Arc::new).collect();

    let engine = Engine::with_builtin_rules();
    let report = engine.audit(&units, &selection).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::render_text_report(&report, &skipped);
    }

    if report.findings.is_empty() {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_FINDINGS)
    }
}
