//! Terminal rendering for audit reports: findings plus per-rule and per-unit
//! summaries.

use std::collections::BTreeMap;

use colored::Colorize;

use kubeaudit_analysis::AuditReport;
use kubeaudit_core::LoadDiagnostic;

/// Count findings per rule and per source file.
pub fn summarize(report: &AuditReport) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut by_rule: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_file: BTreeMap<String, usize> = BTreeMap::new();
    for finding in &report.findings {
        *by_rule.entry(finding.rule_id.clone()).or_default() += 1;
        *by_file.entry(finding.file.clone()).or_default() += 1;
    }
    (by_rule, by_file)
}

pub fn render_text_report(report: &AuditReport, skipped: &[LoadDiagnostic]) {
    for finding in &report.findings {
        println!(
            "{}:{}:{}: {} {} — {}",
            finding.file,
            finding.line,
            finding.column,
            finding.rule_id.bold(),
            finding.title.yellow(),
            finding.message
        );
        println!("    {}", finding.suggestion.dimmed());
    }

    if !report.rule_failures.is_empty() {
        println!();
        for failure in &report.rule_failures {
            println!(
                "{} rule {} skipped for {}",
                "warning:".yellow(),
                failure.rule_id,
                failure.unit
            );
        }
    }

    if !skipped.is_empty() {
        println!();
        for diag in skipped {
            println!("{} unit {} skipped: {}", "warning:".yellow(), diag.dir, diag.reason);
        }
    }

    println!();
    if report.findings.is_empty() {
        println!("{}", "No findings.".green());
        return;
    }

    let (by_rule, by_file) = summarize(report);
    println!(
        "{} finding(s) across {} file(s):",
        report.findings.len(),
        by_file.len()
    );
    for (rule_id, count) in &by_rule {
        println!("  {rule_id}: {count}");
    }
}
