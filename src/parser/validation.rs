// ABOUTME: Pipeline diagnostics for definitions that parse but are ambiguous
// ABOUTME: Reports conflicting node kinds, unknown exit policies, and no-op nodes without failing

use std::fmt;

use super::node::{NodeConfig, NodeKind};
use crate::engine::ExitPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `parallel` is populated on a command node and ignored.
    BogusParallel,
    /// `steps` is populated on a command or parallel node and ignored.
    BogusSteps,
    UnknownPolicy(String),
    /// `onExit` on a parallel node does not restart the group.
    ParallelPolicy(String),
    EmptyNode,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::BogusParallel => write!(f, "bogus `parallel` list"),
            DiagnosticKind::BogusSteps => write!(f, "bogus `steps` list"),
            DiagnosticKind::UnknownPolicy(token) => write!(
                f,
                "unknown exit policy '{}', using '{}'",
                token,
                ExitPolicy::default()
            ),
            DiagnosticKind::ParallelPolicy(token) => {
                write!(f, "`onExit: {}` has no effect on a parallel group", token)
            }
            DiagnosticKind::EmptyNode => write!(f, "noop node"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Location in the tree, e.g. `deploy/steps[1]/parallel[0]`.
    pub path: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Diagnostics for one node, ignoring its children.
pub fn node_diagnostics(node: &NodeConfig) -> Vec<DiagnosticKind> {
    let mut found = Vec::new();

    match node.kind() {
        NodeKind::Command => {
            if node.is_parallel() {
                found.push(DiagnosticKind::BogusParallel);
            }
            if node.is_serial() {
                found.push(DiagnosticKind::BogusSteps);
            }
        }
        NodeKind::Parallel => {
            if node.is_serial() {
                found.push(DiagnosticKind::BogusSteps);
            }
        }
        NodeKind::Serial => {}
        NodeKind::Empty => found.push(DiagnosticKind::EmptyNode),
    }

    if node.on_exit.parse::<ExitPolicy>().is_err() {
        found.push(DiagnosticKind::UnknownPolicy(node.on_exit.clone()));
    } else if node.kind() == NodeKind::Parallel && !node.on_exit.trim().is_empty() {
        found.push(DiagnosticKind::ParallelPolicy(node.on_exit.clone()));
    }

    found
}

/// Walk the whole tree and collect every diagnostic, parents first.
pub fn validate(root: &NodeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    walk(root, root.id(), &mut report);
    report
}

fn walk(node: &NodeConfig, path: String, report: &mut ValidationReport) {
    for kind in node_diagnostics(node) {
        report.diagnostics.push(Diagnostic {
            path: path.clone(),
            kind,
        });
    }

    let label = match node.kind() {
        NodeKind::Parallel => "parallel",
        _ => "steps",
    };

    for (idx, child) in node.children().iter().enumerate() {
        walk(child, format!("{}/{}[{}]", path, label, idx), report);
    }
}
