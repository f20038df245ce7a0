//! End-to-end filling of a source W-4.

use crate::error::Result;
use crate::form::{apply_assignments, AcroForm, ApplyReport};
use crate::model::{CalcResult, UserRecord};
use crate::populate::FormPopulator;

/// A filled and flattened document.
#[derive(Debug, Clone)]
pub struct FilledForm {
    /// Serialized PDF
    pub bytes: Vec<u8>,
    /// Which assignments were written
    pub report: ApplyReport,
}

/// Fill `source` with the user's data, flatten it and serialize the result.
///
/// Only document-level failures are errors; fields missing from this revision of
/// the form are recorded in the report.
pub fn fill_form(
    source: &[u8],
    user: &UserRecord,
    calc: &CalcResult,
    populator: &FormPopulator,
) -> Result<FilledForm> {
    let mut form = AcroForm::load(source)?;
    let assignments = populator.compute_assignments(user, calc, &form);
    let report = apply_assignments(&mut form, &assignments);

    if report.is_complete() {
        log::info!("Applied {} field assignments", report.applied);
    } else {
        log::warn!(
            "Applied {} of {} field assignments; skipped: {}",
            report.applied,
            assignments.len(),
            report
                .skipped
                .iter()
                .map(|s| s.target_field.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    form.flatten()?;
    let bytes = form.save()?;
    Ok(FilledForm { bytes, report })
}
