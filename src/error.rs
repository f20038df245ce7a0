//! Error types for W-4 generation.
//!
//! This module defines all error types that can occur while loading the source form,
//! filling its fields and serving the result.

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during form generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF library rejected the document
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Encrypted documents cannot be filled
    #[error("Encrypted PDF documents are not supported")]
    Encrypted,

    /// Document has no interactive form
    #[error("Document has no AcroForm fields")]
    NoAcroForm,

    /// Field identifier does not exist in the loaded document
    #[error("Form field not found: {0}")]
    FieldNotFound(String),

    /// Field exists but is of another kind
    #[error("Form field {field} has wrong type: expected {expected}, found {found}")]
    FieldTypeMismatch {
        /// Fully qualified field name
        field: String,
        /// Expected field kind
        expected: String,
        /// Actual field kind
        found: String,
    },

    /// Text value exceeds the field's /MaxLen
    #[error("Value for {field} is {actual} characters, field allows {max}")]
    ValueTooLong {
        /// Fully qualified field name
        field: String,
        /// The field's /MaxLen
        max: usize,
        /// Length of the rejected value
        actual: usize,
    },

    /// No payment/authorization token was supplied
    #[error("Payment required")]
    AuthorizationMissing,

    /// The source document could not be retrieved
    #[error("Failed to fetch W-4 PDF: {0}")]
    UpstreamFetch(String),

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_not_found_error() {
        let err = Error::FieldNotFound("topmostSubform[0].Page1[0].f1_09[0]".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("not found"));
        assert!(msg.contains("f1_09[0]"));
    }

    #[test]
    fn test_field_type_mismatch_error() {
        let err = Error::FieldTypeMismatch {
            field: "c1_1[0]".to_string(),
            expected: "text".to_string(),
            found: "checkbox".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("c1_1[0]"));
        assert!(msg.contains("expected text"));
        assert!(msg.contains("found checkbox"));
    }

    #[test]
    fn test_value_too_long_error() {
        let err = Error::ValueTooLong {
            field: "ssn".to_string(),
            max: 9,
            actual: 11,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("11 characters"));
        assert!(msg.contains("allows 9"));
    }

    #[test]
    fn test_upstream_fetch_error() {
        let err = Error::UpstreamFetch("HTTP 503".to_string());
        assert_eq!(format!("{}", err), "Failed to fetch W-4 PDF: HTTP 503");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{}", err).contains("missing.pdf"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
