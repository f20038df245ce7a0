//! Form-field population.
//!
//! [`FormPopulator`] turns a [`UserRecord`] and [`CalcResult`] into the ordered
//! list of [`FieldAssignment`]s to apply to a W-4. It performs no I/O: the only
//! question it asks of the document is which SSN candidate exists, through
//! [`FormHandle`].
//!
//! # Example
//!
//! ```
//! use taxflow_w4::catalog::FormProfile;
//! use taxflow_w4::form::FormHandle;
//! use taxflow_w4::model::{CalcResult, UserRecord};
//! use taxflow_w4::populate::FormPopulator;
//!
//! struct NoSsnField;
//! impl FormHandle for NoSsnField {
//!     fn has_readable_text_field(&self, _identifier: &str) -> bool {
//!         false
//!     }
//! }
//!
//! let populator = FormPopulator::new(FormProfile::default());
//! let user = UserRecord { first_name: Some("jane".into()), ..Default::default() };
//! let assignments = populator.compute_assignments(&user, &CalcResult::default(), &NoSsnField);
//! assert_eq!(assignments[0].value.as_deref(), Some("JANE"));
//! ```

use crate::catalog::FormProfile;
use crate::form::FormHandle;
use crate::format::{city_state_zip, format_ssn, positive_amount, upper};
use crate::model::{CalcResult, FilingStatus, UserRecord};

/// How an assignment is applied to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    /// Set a text field's value
    Text,
    /// Check a checkbox
    Check,
}

/// One instruction to set a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
    /// Fully qualified field identifier
    pub target_field: String,
    /// Text or checkbox
    pub kind: AssignmentKind,
    /// Value for text assignments; `None` for checks
    pub value: Option<String>,
}

impl FieldAssignment {
    /// A text assignment.
    pub fn text(target_field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target_field: target_field.into(),
            kind: AssignmentKind::Text,
            value: Some(value.into()),
        }
    }

    /// A checkbox assignment.
    pub fn check(target_field: impl Into<String>) -> Self {
        Self {
            target_field: target_field.into(),
            kind: AssignmentKind::Check,
            value: None,
        }
    }
}

/// Computes field assignments against a fixed [`FormProfile`].
#[derive(Debug, Clone)]
pub struct FormPopulator {
    profile: FormProfile,
}

impl Default for FormPopulator {
    fn default() -> Self {
        Self::new(FormProfile::default())
    }
}

impl FormPopulator {
    /// Create a populator for the given profile.
    pub fn new(profile: FormProfile) -> Self {
        Self { profile }
    }

    /// The profile this populator targets.
    pub fn profile(&self) -> &FormProfile {
        &self.profile
    }

    /// Compute the assignments for one request, in application order.
    pub fn compute_assignments(
        &self,
        user: &UserRecord,
        calc: &CalcResult,
        form: &impl FormHandle,
    ) -> Vec<FieldAssignment> {
        let fields = &self.profile.fields;
        let mut out = Vec::with_capacity(16);

        // Step 1a, always assigned even when empty
        out.push(FieldAssignment::text(&fields.first_name, upper(user.first_name.as_deref())));
        out.push(FieldAssignment::text(&fields.last_name, upper(user.last_name.as_deref())));
        out.push(FieldAssignment::text(&fields.address, upper(user.address.as_deref())));
        out.push(FieldAssignment::text(
            &fields.city_state_zip,
            city_state_zip(user.city.as_deref(), user.state.as_deref(), user.zip.as_deref()),
        ));

        if let Some(ssn_field) = self.resolve_ssn_field(form) {
            out.push(FieldAssignment::text(ssn_field, format_ssn(user.ssn.as_deref())));
        }

        if let Some(status) = &user.filing_status {
            if let Some(checkbox) = self.filing_checkbox(status) {
                out.push(FieldAssignment::check(checkbox));
            }
        }

        if calc.multiple_jobs {
            out.push(FieldAssignment::check(&fields.multiple_jobs));
        }

        let amounts = [
            (&fields.step3a, calc.children_credit),
            (&fields.step3b, calc.other_credit),
            (&fields.step3_total, calc.total_credits),
            (&fields.step4a, calc.other_income),
            (&fields.step4b, calc.deductions),
            (&fields.step4c, calc.extra_withholding),
        ];
        for (field, amount) in amounts {
            if let Some(value) = positive_amount(amount) {
                out.push(FieldAssignment::text(field, value));
            }
        }

        out
    }

    /// First SSN candidate the document exposes as a readable text field.
    pub fn resolve_ssn_field<'a>(&'a self, form: &impl FormHandle) -> Option<&'a str> {
        self.profile
            .ssn_candidates
            .iter()
            .find(|candidate| form.has_readable_text_field(candidate))
    }

    /// Checkbox identifier for a filing status.
    pub fn filing_checkbox(&self, status: &FilingStatus) -> Option<&str> {
        let fields = &self.profile.fields;
        match status {
            FilingStatus::Single | FilingStatus::MarriedFilingSeparately => {
                Some(fields.single.as_str())
            },
            FilingStatus::Married | FilingStatus::Widow => Some(fields.married.as_str()),
            FilingStatus::HeadOfHousehold => Some(fields.hoh.as_str()),
            FilingStatus::Other(_) => None,
        }
    }
}
