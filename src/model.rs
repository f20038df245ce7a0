//! Request data model.
//!
//! Clients submit loosely typed JSON: numbers where strings are expected, numeric
//! strings for amounts, `null` for anything. Decoding is permissive; a sub-field
//! that cannot be interpreted is treated as absent, never as an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Filing status selected in Step 1(c).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingStatus {
    /// Single
    Single,
    /// Married filing separately
    MarriedFilingSeparately,
    /// Married filing jointly
    Married,
    /// Qualifying surviving spouse
    Widow,
    /// Head of household
    HeadOfHousehold,
    /// Any value the form has no checkbox for
    Other(String),
}

impl FilingStatus {
    /// Parse from the wire code (`single`, `mfs`, `married`, `widow`, `head`).
    pub fn from_code(code: &str) -> Self {
        match code {
            "single" => FilingStatus::Single,
            "mfs" => FilingStatus::MarriedFilingSeparately,
            "married" => FilingStatus::Married,
            "widow" => FilingStatus::Widow,
            "head" => FilingStatus::HeadOfHousehold,
            other => FilingStatus::Other(other.to_string()),
        }
    }

    /// The wire code.
    pub fn code(&self) -> &str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingSeparately => "mfs",
            FilingStatus::Married => "married",
            FilingStatus::Widow => "widow",
            FilingStatus::HeadOfHousehold => "head",
            FilingStatus::Other(code) => code,
        }
    }
}

impl<'de> Deserialize<'de> for FilingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(FilingStatus::from_code(&code))
    }
}

/// Personal information from Step 1.
///
/// The filing status is read from `filing`, falling back to `filingStatus`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawUserRecord")]
pub struct UserRecord {
    /// First name and middle initial
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City or town
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// ZIP code
    pub zip: Option<String>,
    /// Filing status
    pub filing_status: Option<FilingStatus>,
    /// Social security number, free-form
    pub ssn: Option<String>,
}

/// Wire shape of [`UserRecord`], with both filing status keys kept apart.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawUserRecord {
    #[serde(deserialize_with = "lenient_string")]
    first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    zip: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    filing: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    filing_status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    ssn: Option<String>,
}

impl From<RawUserRecord> for UserRecord {
    fn from(raw: RawUserRecord) -> Self {
        UserRecord {
            first_name: raw.first_name,
            last_name: raw.last_name,
            address: raw.address,
            city: raw.city,
            state: raw.state,
            zip: raw.zip,
            filing_status: first_present(raw.filing, raw.filing_status)
                .map(|code| FilingStatus::from_code(&code)),
            ssn: raw.ssn,
        }
    }
}

/// Results of the withholding calculation (Steps 2 to 4).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalcResult {
    /// Step 2(c) checkbox
    #[serde(deserialize_with = "truthy")]
    pub multiple_jobs: bool,
    /// Step 3 qualifying children
    #[serde(deserialize_with = "lenient_amount")]
    pub children_credit: Option<f64>,
    /// Step 3 other dependents
    #[serde(deserialize_with = "lenient_amount")]
    pub other_credit: Option<f64>,
    /// Step 3 total
    #[serde(deserialize_with = "lenient_amount")]
    pub total_credits: Option<f64>,
    /// Step 4(a)
    #[serde(deserialize_with = "lenient_amount")]
    pub other_income: Option<f64>,
    /// Step 4(b)
    #[serde(deserialize_with = "lenient_amount")]
    pub deductions: Option<f64>,
    /// Step 4(c)
    #[serde(deserialize_with = "lenient_amount")]
    pub extra_withholding: Option<f64>,
}

/// Body of a W-4 generation request.
///
/// The token is read from `authToken`, falling back to the legacy `whopToken`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawGenerateRequest")]
pub struct GenerateRequest {
    /// Personal information
    pub user_data: UserRecord,
    /// Calculation results
    pub calc_results: CalcResult,
    /// Opaque payment/authorization token
    pub auth_token: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawGenerateRequest {
    user_data: UserRecord,
    calc_results: CalcResult,
    #[serde(deserialize_with = "lenient_string")]
    auth_token: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    whop_token: Option<String>,
}

impl From<RawGenerateRequest> for GenerateRequest {
    fn from(raw: RawGenerateRequest) -> Self {
        GenerateRequest {
            user_data: raw.user_data,
            calc_results: raw.calc_results,
            auth_token: first_present(raw.auth_token, raw.whop_token),
        }
    }
}

/// The first value that is not blank, else whichever one was sent.
fn first_present(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if present(&primary) {
        primary
    } else if present(&fallback) {
        fallback
    } else {
        primary.or(fallback)
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    })
}
