//! Form input validation.
//!
//! Rule functions return `Result<(), String>` (or a parsed value) so
//! handlers can collect every failure and re-render the submitting view
//! with the full list.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose email shape check; the store's uniqueness constraint and the
    /// credential check do the real work
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    /// Personal names: letters, then letters/spaces/apostrophes/hyphens
    static ref NAME_REGEX: Regex = Regex::new(r"^[A-Za-z][A-Za-z '\-]*$").unwrap();

    /// Classification names: alphanumeric, no spaces or special characters
    static ref CLASSIFICATION_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required.".to_string());
    }
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("A valid email address is required.".to_string());
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required.", field));
    }
    if !NAME_REGEX.is_match(value.trim()) {
        return Err(format!("{} contains invalid characters.", field));
    }
    Ok(())
}

/// Password policy: 12+ characters mixing upper, lower, digit, and special.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < 12 {
        return Err("Password must be at least 12 characters.".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit.".to_string());
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err("Password must contain at least one special character.".to_string());
    }
    Ok(())
}

pub fn validate_classification_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Classification name is required.".to_string());
    }
    if !CLASSIFICATION_REGEX.is_match(name.trim()) {
        return Err(
            "Classification name cannot contain spaces or special characters.".to_string(),
        );
    }
    Ok(())
}

pub fn validate_min_len(field: &str, value: &str, min: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is required.", field));
    }
    if trimmed.chars().count() < min {
        return Err(format!("{} must be at least {} characters long.", field, min));
    }
    Ok(())
}

pub fn parse_year(value: &str) -> Result<i64, String> {
    match value.trim().parse::<i64>() {
        Ok(year) if (1900..=2100).contains(&year) => Ok(year),
        _ => Err("Year must be between 1900 and 2100.".to_string()),
    }
}

pub fn parse_price(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(price) if price >= 0.0 && price.is_finite() => Ok(price),
        _ => Err("Price must be a valid number of at least 0.".to_string()),
    }
}

pub fn parse_miles(value: &str) -> Result<i64, String> {
    match value.trim().parse::<i64>() {
        Ok(miles) if miles >= 0 => Ok(miles),
        _ => Err("Miles must be a valid whole number.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert!(validate_email("e@x.com").is_ok());
        assert!(validate_email("first.last@sub.domain.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@x.com").is_err());
        assert!(validate_email("spaces in@x.com").is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("First name", "Anna-Lise").is_ok());
        assert!(validate_name("Last name", "O'Neil").is_ok());
        assert!(validate_name("First name", "").is_err());
        assert!(validate_name("First name", "123").is_err());
        let err = validate_name("Last name", "").unwrap_err();
        assert!(err.starts_with("Last name"));
    }

    #[test]
    fn password_rules() {
        assert!(validate_password_strength("Str0ng&Secure!pw").is_ok());
        assert!(validate_password_strength("short1A!").is_err());
        assert!(validate_password_strength("alllowercase1!aa").is_err());
        assert!(validate_password_strength("ALLUPPERCASE1!AA").is_err());
        assert!(validate_password_strength("NoDigitsHere!!aa").is_err());
        assert!(validate_password_strength("NoSpecials123abc").is_err());
    }

    #[test]
    fn classification_rules() {
        assert!(validate_classification_name("SUV").is_ok());
        assert!(validate_classification_name("Sport2").is_ok());
        assert!(validate_classification_name("").is_err());
        assert!(validate_classification_name("Sport Utility").is_err());
        assert!(validate_classification_name("SUV!").is_err());
    }

    #[test]
    fn numeric_fields() {
        assert_eq!(parse_year("2021"), Ok(2021));
        assert!(parse_year("1850").is_err());
        assert!(parse_year("soon").is_err());

        assert_eq!(parse_price("23950"), Ok(23950.0));
        assert_eq!(parse_price("0"), Ok(0.0));
        assert!(parse_price("-5").is_err());
        assert!(parse_price("NaN").is_err());

        assert_eq!(parse_miles("40200"), Ok(40200));
        assert!(parse_miles("-1").is_err());
        assert!(parse_miles("12.5").is_err());
    }

    #[test]
    fn min_len_rule() {
        assert!(validate_min_len("Make", "Aldo", 3).is_ok());
        assert!(validate_min_len("Make", "Al", 3).is_err());
        assert!(validate_min_len("Description", "  ", 10).is_err());
    }
}
