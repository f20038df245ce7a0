// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # TaxFlow W-4
//!
//! Fills the IRS Form W-4 (Employee's Withholding Certificate) from a user's
//! profile and the results of a withholding calculation, then flattens it so the
//! values are printed into the page.
//!
//! ## Pieces
//!
//! - **Populate**: [`FormPopulator`] maps a [`UserRecord`] and [`CalcResult`] to an
//!   ordered list of [`FieldAssignment`]s. Pure, never fails.
//! - **Form**: [`AcroForm`] loads a PDF, writes text and checkbox values with
//!   regenerated appearances, and flattens the form.
//! - **Service**: an axum router ([`server::router`]) that fetches the current
//!   blank form, fills it and returns it as a download.
//!
//! ## Quick Start
//!
//! ```no_run
//! use taxflow_w4::{fill_form, CalcResult, FormPopulator, UserRecord};
//!
//! # fn main() -> taxflow_w4::Result<()> {
//! let blank = std::fs::read("fw4.pdf")?;
//! let user: UserRecord = serde_json::from_str(r#"{"firstName":"Jane","filing":"single"}"#)?;
//! let calc: CalcResult = serde_json::from_str(r#"{"childrenCredit":2000}"#)?;
//!
//! let filled = fill_form(&blank, &user, &calc, &FormPopulator::default())?;
//! std::fs::write("W4-filled.pdf", &filled.bytes)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Field catalog and request model
pub mod catalog;
pub mod format;
pub mod model;

// Mapping user data to form fields
pub mod populate;

// PDF form access
pub mod form;
pub mod generate;

// Service
pub mod auth;
pub mod config;
pub mod server;
pub mod source;

// Re-exports
pub use catalog::{FieldCatalog, FormProfile, SsnFieldCandidates};
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use form::{apply_assignments, AcroForm, ApplyReport, FillableForm, FormHandle};
pub use generate::{fill_form, FilledForm};
pub use model::{CalcResult, FilingStatus, GenerateRequest, UserRecord};
pub use populate::{AssignmentKind, FieldAssignment, FormPopulator};
