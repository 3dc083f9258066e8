//! Canonical phone number type.
//!
//! WhatsApp delivers sender IDs as bare digit strings (`15551234567`), Twilio
//! as E.164 (`+15551234567`), and operators type admin allow-lists by hand.
//! All of them are normalized to one canonical digit-only form so that
//! allow-list membership checks and outbound "ready" notifications agree on
//! the address regardless of which surface produced it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when normalizing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input contains no digits at all.
    #[error("phone number contains no digits")]
    NoDigits,
    /// The digit count is outside the plausible range.
    #[error("phone number must have between {min} and {max} digits (got {got})")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
        /// Observed digit count.
        got: usize,
    },
}

/// A phone number in canonical form: digits only, no `+`, no separators,
/// international-prefix `00` stripped.
///
/// ## Examples
///
/// ```
/// use lastcall_core::PhoneNumber;
///
/// let a = PhoneNumber::normalize("+1 (555) 123-4567").unwrap();
/// let b = PhoneNumber::normalize("15551234567").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "15551234567");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum plausible digit count (short national numbers).
    pub const MIN_DIGITS: usize = 5;
    /// Maximum digit count per E.164 plus a small margin for sloppy input.
    pub const MAX_DIGITS: usize = 16;

    /// Normalize a raw phone string into canonical form.
    ///
    /// Keeps digits, drops everything else, then strips a leading `00`
    /// international prefix (a leading `+` disappears with the non-digits).
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no digits or an implausible
    /// digit count.
    pub fn normalize(raw: &str) -> Result<Self, PhoneError> {
        let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(PhoneError::NoDigits);
        }

        if let Some(rest) = digits.strip_prefix("00") {
            digits = rest.to_owned();
        }

        let got = digits.len();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&got) {
            return Err(PhoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                got,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the canonical digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Render in E.164 form for providers that require a `+` prefix.
    #[must_use]
    pub fn to_e164(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_variants_agree() {
        let forms = [
            "+1 (555) 123-4567",
            "1-555-123-4567",
            "15551234567",
            "001 555 123 4567",
        ];
        let canonical = PhoneNumber::normalize("15551234567").unwrap();
        for form in forms {
            assert_eq!(PhoneNumber::normalize(form).unwrap(), canonical, "{form}");
        }
    }

    #[test]
    fn test_normalize_no_digits() {
        assert!(matches!(
            PhoneNumber::normalize("call me maybe"),
            Err(PhoneError::NoDigits)
        ));
    }

    #[test]
    fn test_normalize_bad_length() {
        assert!(matches!(
            PhoneNumber::normalize("123"),
            Err(PhoneError::BadLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::normalize("12345678901234567890"),
            Err(PhoneError::BadLength { .. })
        ));
    }

    #[test]
    fn test_e164_rendering() {
        let p = PhoneNumber::normalize("49 170 1234567").unwrap();
        assert_eq!(p.to_e164(), "+491701234567");
    }

    #[test]
    fn test_serde_transparent() {
        let p = PhoneNumber::normalize("15551234567").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"15551234567\"");
    }
}
