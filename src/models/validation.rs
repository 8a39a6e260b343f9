use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// Email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(anyhow!("Email cannot be empty"));
    }

    if email.len() > 255 {
        return Err(anyhow!("Email cannot be longer than 255 characters"));
    }

    if !email_regex().is_match(email) {
        return Err(anyhow!("Invalid email format"));
    }

    Ok(())
}

/// Require a non-blank text field no longer than `max_len` characters
pub fn validate_required_text(value: &str, field_name: &str, max_len: usize) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} cannot be empty", field_name));
    }

    if trimmed.chars().count() > max_len {
        return Err(anyhow!("{} cannot be longer than {} characters", field_name, max_len));
    }

    Ok(())
}

/// Validate an integer lies within an inclusive range
pub fn validate_range(value: i32, min: i32, max: i32, field_name: &str) -> Result<()> {
    if value < min || value > max {
        return Err(anyhow!("{} must be between {} and {}", field_name, min, max));
    }
    Ok(())
}

/// Validate a monetary amount
pub fn validate_price(price: f64, field_name: &str) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(anyhow!("{} must be zero or a positive amount", field_name));
    }
    Ok(())
}

/// Validate an absolute http(s) URL
pub fn validate_url(url: &str, field_name: &str) -> Result<()> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) || url.len() <= "https://".len() {
        return Err(anyhow!("{} must be an http(s) URL", field_name));
    }
    Ok(())
}

/// Trim list entries and drop the blank ones
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Trim an optional text field, mapping blank values to `None`
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim an optional text field for a partial update. `None` leaves the column
/// alone, while a blank value survives as `""` and clears it.
pub fn trim_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
