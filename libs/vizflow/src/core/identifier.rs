// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Processor identifier normalization and uniqueness probing.
//!
//! Identifiers key the network's processor map. Requested identifiers are
//! stripped of disallowed characters before registration, and collisions are
//! resolved by probing numeric suffixes (`foo`, `foo2`, `foo3`, ...).

/// Strip an identifier down to its allowed character set.
///
/// Keeps ASCII alphanumerics, `_`, `-` and spaces; everything else is
/// dropped. Surrounding whitespace is trimmed. An identifier that strips to
/// nothing falls back to `"Processor"`.
pub fn strip_identifier(identifier: &str) -> String {
    let stripped: String = identifier
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        "Processor".to_string()
    } else {
        stripped.to_string()
    }
}

/// Find an unused identifier derived from `base`.
///
/// Probes `base` itself first, then `base2`, `base3`, ... until `is_unused`
/// accepts a candidate. The probe sequence is deterministic so that loading
/// the same workspace twice assigns the same identifiers.
pub fn find_unique_identifier(base: &str, is_unused: impl Fn(&str) -> bool) -> String {
    if is_unused(base) {
        return base.to_string();
    }
    let mut n: u64 = 2;
    loop {
        let candidate = format!("{base}{n}");
        if is_unused(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
