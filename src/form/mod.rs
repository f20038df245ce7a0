//! Applying field assignments to a form.
//!
//! The populator only needs [`FormHandle`] to decide which SSN identifier the
//! document carries. Writing values goes through [`FillableForm`], and
//! [`apply_assignments`] applies a whole list best-effort: a field the document
//! lacks is logged and skipped, and the remaining assignments still run.

pub mod acroform;
pub mod appearance;
pub mod field_flags;

pub use acroform::{AcroForm, FieldKind};

use crate::error::Result;
use crate::populate::{AssignmentKind, FieldAssignment};

/// Read-only view of a form used while computing assignments.
pub trait FormHandle {
    /// Whether a text field with this identifier exists and its value can be read.
    fn has_readable_text_field(&self, identifier: &str) -> bool;
}

/// A form whose fields can be written one at a time.
pub trait FillableForm: FormHandle {
    /// Set a text field's value.
    fn set_text(&mut self, identifier: &str, value: &str) -> Result<()>;

    /// Check a checkbox.
    fn check(&mut self, identifier: &str) -> Result<()>;
}

/// An assignment that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAssignment {
    /// Target field identifier
    pub target_field: String,
    /// Error message
    pub reason: String,
}

/// Outcome of [`apply_assignments`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of assignments written
    pub applied: usize,
    /// Assignments that failed, in order
    pub skipped: Vec<SkippedAssignment>,
}

impl ApplyReport {
    /// Whether every assignment was written.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Apply assignments in order, continuing past per-field failures.
pub fn apply_assignments<F>(form: &mut F, assignments: &[FieldAssignment]) -> ApplyReport
where
    F: FillableForm + ?Sized,
{
    let mut report = ApplyReport::default();

    for assignment in assignments {
        let result = match assignment.kind {
            AssignmentKind::Text => form.set_text(
                &assignment.target_field,
                assignment.value.as_deref().unwrap_or(""),
            ),
            AssignmentKind::Check => form.check(&assignment.target_field),
        };

        match result {
            Ok(()) => report.applied += 1,
            Err(e) => {
                log::debug!("Skipping field {}: {}", assignment.target_field, e);
                report.skipped.push(SkippedAssignment {
                    target_field: assignment.target_field.clone(),
                    reason: e.to_string(),
                });
            },
        }
    }

    report
}
