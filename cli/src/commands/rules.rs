//! The `rules` command: print the catalog.

use colored::Colorize;

use kubeaudit_analysis::rules::registry::{RuleRegistry, DEFAULT_DISABLED};

pub fn execute() {
    let registry = RuleRegistry::with_builtin_rules();
    println!("{} rules:", registry.len());
    for rule in registry.all() {
        let id = rule.id();
        let marker = if DEFAULT_DISABLED.contains(&id) {
            " (disabled by default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}  {}{}", id.bold(), rule.title(), marker);
        println!("          {}", rule.suggestion().dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_does_not_panic() {
        execute();
    }
}
