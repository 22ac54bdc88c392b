//! Stale-bounds guard for slice edits.
//!
//! A slice edit carries the bounds its sender last observed. The edit may
//! only proceed when those bounds still describe the page.

use std::collections::BTreeMap;

use bite_protocols::Bounds;

/// Outcome of comparing expected bounds with the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Expectations hold; `current` is the target section's live bounds.
    Fresh { index: usize, current: Bounds },
    /// The timeline moved since the sender's last read.
    Stale {
        /// Labels whose bounds differ from the expectation.
        mismatched: Vec<String>,
        /// Expected labels not on the page.
        missing: Vec<String>,
        /// The target section itself was absent from page or expectations.
        target_unknown: bool,
    },
}

impl Reconciliation {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Reconciliation::Fresh { .. })
    }

    /// One-line description of a stale outcome.
    pub fn describe(&self) -> String {
        match self {
            Reconciliation::Fresh { .. } => "bounds match".to_string(),
            Reconciliation::Stale {
                mismatched,
                missing,
                target_unknown,
            } => {
                let mut parts = Vec::new();
                if !mismatched.is_empty() {
                    parts.push(format!("moved: {}", mismatched.join(", ")));
                }
                if !missing.is_empty() {
                    parts.push(format!("missing: {}", missing.join(", ")));
                }
                if *target_unknown {
                    parts.push("target not reconciled".to_string());
                }
                parts.join("; ")
            }
        }
    }
}

/// Compare `expected` with the `current` page bounds for an edit of `target`.
///
/// Every expected label must exist with bounds within `tolerance`, and the
/// target must be both on the page and among the expectations.
///
/// This is stricter than aborting only when no section matches: a single
/// moved or missing section makes the whole expectation stale, since any
/// shift on the timeline invalidates the caller's view of it.
pub fn reconcile(
    current: &[(String, Bounds)],
    expected: &BTreeMap<String, Bounds>,
    target: &str,
    tolerance: f64,
) -> Reconciliation {
    let mut mismatched = Vec::new();
    let mut missing = Vec::new();

    for (label, want) in expected {
        match current.iter().find(|(l, _)| l == label) {
            Some((_, have)) if have.approx_eq(want, tolerance) => {}
            Some(_) => mismatched.push(label.clone()),
            None => missing.push(label.clone()),
        }
    }

    let found = current
        .iter()
        .position(|(l, _)| l == target)
        .filter(|_| expected.contains_key(target));

    match found {
        Some(index) if mismatched.is_empty() && missing.is_empty() => Reconciliation::Fresh {
            index,
            current: current[index].1,
        },
        _ => Reconciliation::Stale {
            mismatched,
            missing,
            target_unknown: found.is_none(),
        },
    }
}
