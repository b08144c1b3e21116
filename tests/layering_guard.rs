//! Layering guardrails to keep the expansion engine free of host concerns.
//!
//! `matrixcase_core` is a pure engine: no CLI, no process spawning, no JSON. This test scans its `Cargo.toml` and
//! fails if a host-side crate appears in `[dependencies]`.

const HOST_ONLY: &[&str] = &[
    "matrixcase",
    "clap",
    "miette",
    "serde_json",
    "tracing-subscriber",
    "matrixcase_derive",
];

#[test]
fn core_does_not_depend_on_host_crates() {
    let manifest = include_str!("../crates/matrixcase_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        let name = line_no_comment.split('=').next().unwrap_or("").trim();
        if HOST_ONLY.contains(&name) {
            panic!("`{}` must not appear in matrixcase_core [dependencies]", name);
        }
    }
}

#[test]
fn core_serde_support_stays_optional() {
    let manifest = include_str!("../crates/matrixcase_core/Cargo.toml");
    let serde_line = manifest
        .lines()
        .find(|line| line.trim_start().starts_with("serde "))
        .expect("matrixcase_core declares serde");
    assert!(serde_line.contains("optional = true"), "serde must stay optional: {}", serde_line);
}
