//! Field identifier catalogs.
//!
//! A [`FormProfile`] names every fillable element the populator may target: the
//! [`FieldCatalog`] of fixed identifiers and the ordered [`SsnFieldCandidates`]
//! checked against the loaded document. Profiles are immutable once loaded.
//!
//! The built-in profile matches the 2026 revision of the IRS W-4. Other revisions
//! can be described in JSON:
//!
//! ```json
//! {
//!   "fields": { "firstName": "topmostSubform[0].Page1[0].Step1a[0].f1_01[0]", ... },
//!   "ssnCandidates": ["topmostSubform[0].Page1[0].Step1b[0].f1_05[0]"]
//! }
//! ```

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PAGE1: &str = "topmostSubform[0].Page1[0]";

lazy_static! {
    static ref W4_2026: FormProfile = FormProfile {
        fields: FieldCatalog {
            first_name: format!("{PAGE1}.Step1a[0].f1_01[0]"),
            last_name: format!("{PAGE1}.Step1a[0].f1_02[0]"),
            address: format!("{PAGE1}.Step1a[0].f1_03[0]"),
            city_state_zip: format!("{PAGE1}.Step1a[0].f1_04[0]"),
            single: format!("{PAGE1}.c1_1[0]"),
            married: format!("{PAGE1}.c1_1[1]"),
            hoh: format!("{PAGE1}.c1_1[2]"),
            multiple_jobs: format!("{PAGE1}.c1_2[0]"),
            step3a: format!("{PAGE1}.Step3_ReadOrder[0].f1_06[0]"),
            step3b: format!("{PAGE1}.Step3_ReadOrder[0].f1_07[0]"),
            step3_total: format!("{PAGE1}.f1_08[0]"),
            step4a: format!("{PAGE1}.f1_09[0]"),
            step4b: format!("{PAGE1}.f1_10[0]"),
            step4c: format!("{PAGE1}.f1_11[0]"),
        },
        ssn_candidates: SsnFieldCandidates::new(vec![
            format!("{PAGE1}.Step1b[0].f1_05[0]"),
            format!("{PAGE1}.Step1b[0].f1_04[0]"),
            format!("{PAGE1}.Step1a[0].f1_05[0]"),
            format!("{PAGE1}.Step1a[0].f1_04[1]"),
            format!("{PAGE1}.f1_05[0]"),
            format!("{PAGE1}.f1_04[0]"),
        ]),
    };
}

/// Logical field name to form identifier mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldCatalog {
    /// Step 1a first name
    pub first_name: String,
    /// Step 1a last name
    pub last_name: String,
    /// Step 1a street address
    pub address: String,
    /// Step 1a "city or town, state, and ZIP code"
    pub city_state_zip: String,
    /// Step 1c checkbox: single or married filing separately
    pub single: String,
    /// Step 1c checkbox: married filing jointly or qualifying surviving spouse
    pub married: String,
    /// Step 1c checkbox: head of household
    pub hoh: String,
    /// Step 2c checkbox
    pub multiple_jobs: String,
    /// Step 3 qualifying children amount
    pub step3a: String,
    /// Step 3 other dependents amount
    pub step3b: String,
    /// Step 3 total
    #[serde(rename = "step3Total")]
    pub step3_total: String,
    /// Step 4(a) other income
    pub step4a: String,
    /// Step 4(b) deductions
    pub step4b: String,
    /// Step 4(c) extra withholding
    pub step4c: String,
}

impl FieldCatalog {
    /// All `(logical name, identifier)` pairs in form order.
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("address", &self.address),
            ("cityStateZip", &self.city_state_zip),
            ("single", &self.single),
            ("married", &self.married),
            ("hoh", &self.hoh),
            ("multipleJobs", &self.multiple_jobs),
            ("step3a", &self.step3a),
            ("step3b", &self.step3b),
            ("step3Total", &self.step3_total),
            ("step4a", &self.step4a),
            ("step4b", &self.step4b),
            ("step4c", &self.step4c),
        ]
    }

    /// Look up an identifier by its logical name.
    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == logical)
            .map(|(_, id)| id)
    }

    /// Whether `identifier` is one of this catalog's targets.
    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.entries().iter().any(|(_, id)| *id == identifier)
    }
}

/// Ordered identifiers tried for the SSN field.
///
/// Form revisions have moved the SSN box between subforms; the first candidate
/// that resolves in the loaded document wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SsnFieldCandidates(Vec<String>);

impl SsnFieldCandidates {
    /// Create from an ordered list.
    pub fn new(candidates: Vec<String>) -> Self {
        Self(candidates)
    }

    /// Iterate the candidates in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `identifier` is one of the candidates.
    pub fn contains(&self, identifier: &str) -> bool {
        self.0.iter().any(|c| c == identifier)
    }
}

/// Complete identifier configuration for one form revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormProfile {
    /// Fixed field identifiers
    pub fields: FieldCatalog,
    /// SSN identifiers in priority order
    pub ssn_candidates: SsnFieldCandidates,
}

impl FormProfile {
    /// The built-in 2026 W-4 profile.
    pub fn w4_2026() -> &'static FormProfile {
        &W4_2026
    }

    /// Parse a profile from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: FormProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading form profile from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    /// Check that every identifier is usable.
    pub fn validate(&self) -> Result<()> {
        for (logical, id) in self.fields.entries() {
            if id.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "field catalog entry '{}' has an empty identifier",
                    logical
                )));
            }
        }
        if self.ssn_candidates.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "SSN candidate list contains an empty identifier".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FormProfile {
    fn default() -> Self {
        Self::w4_2026().clone()
    }
}
