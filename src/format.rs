//! Value formatting rules for form fields.

/// Trim surrounding whitespace and upper-case; absent input becomes `""`.
pub fn upper(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_uppercase()
}

/// Build the Step 1a "city or town, state, and ZIP code" line.
///
/// The comma after the city is kept even when parts are missing. The state and
/// ZIP are joined by a single space that is dropped when either side is empty, so
/// an empty city and state yield `", 90210"`.
pub fn city_state_zip(city: Option<&str>, state: Option<&str>, zip: Option<&str>) -> String {
    let state_zip = format!("{} {}", state.unwrap_or(""), zip.unwrap_or(""));
    let line = format!("{}, {}", city.unwrap_or(""), state_zip.trim());
    upper(Some(&line))
}

/// Format a social security number as `DDD-DD-DDDD`.
///
/// Non-digits are ignored when counting. Input that does not contain exactly nine
/// digits is returned unchanged.
pub fn format_ssn(ssn: Option<&str>) -> String {
    let ssn = match ssn {
        Some(s) if !s.is_empty() => s,
        _ => return String::new(),
    };

    let digits: String = ssn.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 9 {
        return ssn.to_string();
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..])
}

/// Render a dollar amount for a numeric field, or `None` unless it is strictly positive.
///
/// Uses the shortest decimal representation: `2000.0` renders as `"2000"` and
/// `1500.5` as `"1500.5"`. Values of `1e21` and above or below `1e-6` switch to
/// exponent notation with an explicit sign, as in `"1e+21"` and `"1e-7"`.
pub fn positive_amount(amount: Option<f64>) -> Option<String> {
    match amount {
        Some(v) if v > 0.0 && v.is_finite() => Some(render_number(v)),
        _ => None,
    }
}

fn render_number(v: f64) -> String {
    if (1e-6..1e21).contains(&v) {
        return v.to_string();
    }
    let exp = format!("{:e}", v);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}
