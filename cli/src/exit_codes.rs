//! Standard exit codes for the kubeaudit CLI.

/// Clean run, no findings.
pub const EXIT_OK: i32 = 0;
/// Run completed and produced findings.
pub const EXIT_FINDINGS: i32 = 1;
/// Runtime failure (load error, network error, git failure).
pub const EXIT_ERROR: i32 = 2;
/// Invalid configuration or usage.
pub const EXIT_CONFIG_ERROR: i32 = 3;
