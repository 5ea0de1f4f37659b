//! Kubernetes resource quantity parsing
//!
//! Resource labels carry CPU and memory figures in the same textual form
//! Kubernetes uses (`250m`, `1.5`, `512Mi`, `2G`, `1e3`). Validation only
//! needs to compare them, so quantities are converted to base units as `f64`.

use thiserror::Error;

/// Binary suffixes are matched before decimal ones
const BINARY_SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1024.0 * 1024.0),
    ("Gi", 1024.0 * 1024.0 * 1024.0),
    ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
];

const DECIMAL_SUFFIXES: &[(&str, f64)] = &[
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    #[error("negative quantity '{0}'")]
    Negative(String),

    #[error("missing '%' in percentage '{0}'")]
    MissingPercent(String),
}

/// Parse a Kubernetes quantity into base units (cores, bytes, ...)
pub fn parse_quantity(input: &str) -> Result<f64, QuantityError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (number, multiplier) = split_suffix(s);
    let value: f64 = number
        .parse()
        .map_err(|_| QuantityError::InvalidNumber(input.to_string()))?;

    if !value.is_finite() {
        return Err(QuantityError::InvalidNumber(input.to_string()));
    }
    if value < 0.0 {
        return Err(QuantityError::Negative(input.to_string()));
    }

    Ok(value * multiplier)
}

/// Parse a percentage such as `"85%"` or `"0.5 %"` into its numeric value
pub fn parse_percent(input: &str) -> Result<f64, QuantityError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }

    let number = s
        .strip_suffix('%')
        .ok_or_else(|| QuantityError::MissingPercent(input.to_string()))?
        .trim_end();

    let value: f64 = number
        .parse()
        .map_err(|_| QuantityError::InvalidNumber(input.to_string()))?;

    if !value.is_finite() {
        return Err(QuantityError::InvalidNumber(input.to_string()));
    }
    Ok(value)
}

fn split_suffix(s: &str) -> (&str, f64) {
    for (suffix, multiplier) in BINARY_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return (number, *multiplier);
        }
    }

    // `E` doubles as exponent marker; `1E3` is a number, `1E` is exa
    for (suffix, multiplier) in DECIMAL_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            if !number.is_empty() && number.ends_with(|c: char| c.is_ascii_digit() || c == '.') {
                return (number, *multiplier);
            }
        }
    }

    (s, 1.0)
}
