//! Structured text model reports.
//!
//! Reports are plain text, not JSON, so a failing test can print one and a
//! reader can see the state of every group at a glance.

use std::fmt;

use model_types::{ConstraintKind, GroupKind, SolveFailure, SolveStatus};
use regen_engine::Model;

use crate::oracle::{self, OracleVerdict};
use crate::workflow::ModelBuilder;

/// A complete model report with all sections.
pub struct ModelReport {
    pub group_entries: Vec<GroupEntry>,
    pub dimensions: Vec<DimensionEntry>,
    pub oracle_results: Vec<OracleVerdict>,
    pub requests: usize,
    pub consistent: bool,
}

/// A single group's report entry.
pub struct GroupEntry {
    pub index: usize,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub clean: bool,
    pub active: bool,
    pub entities: usize,
    pub params: usize,
    pub contours: usize,
    pub triangles: usize,
}

/// A dimensional constraint and its value in view units.
pub struct DimensionEntry {
    pub group: String,
    pub value: String,
    pub reference: bool,
}

fn describe_kind(kind: &GroupKind) -> String {
    match kind {
        GroupKind::References => "References".into(),
        GroupKind::Drawing3d => "Drawing3d".into(),
        GroupKind::DrawingWorkplane => "DrawingWorkplane".into(),
        GroupKind::Extrude { translation } => format!(
            "Extrude ({:.1}, {:.1}, {:.1})",
            translation[0], translation[1], translation[2]
        ),
    }
}

fn describe_status(status: &SolveStatus) -> String {
    match status {
        SolveStatus::NotSolved => "not solved".into(),
        SolveStatus::Okay { dof: 0 } => "ok, fully constrained".into(),
        SolveStatus::Okay { dof } => format!("ok, {} dof", dof),
        SolveStatus::Failed { failure } => match failure {
            SolveFailure::RedundantConstraints => "FAILED: redundant constraints".into(),
            SolveFailure::Inconsistent => "FAILED: inconsistent".into(),
            SolveFailure::TooManyUnknowns { unknowns, max } => {
                format!("FAILED: {} unknowns (max {})", unknowns, max)
            }
            SolveFailure::DidNotConverge {
                iterations,
                residual,
            } => format!(
                "FAILED: no convergence after {} iterations (residual {:e})",
                iterations, residual
            ),
            SolveFailure::Other { reason } => format!("FAILED: {}", reason),
        },
    }
}

impl ModelReport {
    pub fn from_model(model: &Model) -> Self {
        let group_entries = model
            .groups
            .iter()
            .enumerate()
            .map(|(index, g)| {
                let entities: Vec<_> = model.entities.iter().filter(|e| e.group == g.id).collect();
                GroupEntry {
                    index,
                    name: g.name.clone(),
                    kind: describe_kind(&g.kind),
                    status: describe_status(&g.solved),
                    clean: g.clean,
                    active: model.active_group == Some(g.id),
                    entities: entities.len(),
                    params: entities.iter().map(|e| e.params().len()).sum(),
                    contours: g.polygon.contours.len(),
                    triangles: g.mesh.triangles.len(),
                }
            })
            .collect();

        let dimensions = model
            .constraints
            .iter()
            .filter(|c| c.kind == ConstraintKind::PtPtDistance)
            .map(|c| DimensionEntry {
                group: model
                    .group(c.group)
                    .map_or_else(|| c.group.to_string(), |g| g.name.clone()),
                value: model.config.format_length(c.value),
                reference: c.reference,
            })
            .collect();

        Self {
            group_entries,
            dimensions,
            oracle_results: oracle::check_all(model),
            requests: model.requests.len(),
            consistent: model.all_consistent,
        }
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Model Report ===\n\n");

        let failed = self
            .group_entries
            .iter()
            .filter(|g| g.status.starts_with("FAILED"))
            .count();
        out.push_str(&format!(
            "History ({} groups, {} requests, {} failed{}):\n",
            self.group_entries.len(),
            self.requests,
            failed,
            if self.consistent { "" } else { ", stale" },
        ));
        for entry in &self.group_entries {
            let marker = if entry.active { " [ACTIVE]" } else { "" };
            let dirty = if entry.clean { "" } else { " [DIRTY]" };
            out.push_str(&format!(
                "  [{}] {} \"{}\"{}{}\n",
                entry.index, entry.kind, entry.name, marker, dirty,
            ));
            out.push_str(&format!(
                "      {} | {} entities, {} params",
                entry.status, entry.entities, entry.params,
            ));
            if entry.contours > 0 || entry.triangles > 0 {
                out.push_str(&format!(
                    " | {} contours, {} triangles",
                    entry.contours, entry.triangles
                ));
            }
            out.push('\n');
        }

        if !self.dimensions.is_empty() {
            out.push_str("\nDimensions:\n");
            for d in &self.dimensions {
                let kind = if d.reference { "ref" } else { "dim" };
                out.push_str(&format!("  {} {} in \"{}\"\n", kind, d.value, d.group));
            }
        }

        out.push_str(&format!(
            "\nOracle Results ({} checks):\n",
            self.oracle_results.len()
        ));
        for v in &self.oracle_results {
            let status = if v.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
        }

        out
    }
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl ModelBuilder {
    /// Generate a complete model report.
    pub fn report(&self) -> ModelReport {
        ModelReport::from_model(&self.model)
    }
}
