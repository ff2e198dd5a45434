//! # HMS Types
//!
//! Validated value types shared across the HMS workspace.
//!
//! These wrappers guarantee their invariants at construction time so that
//! core services never have to re-validate clinical text or slot times.

use chrono::NaiveTime;

/// Errors that can occur when creating validated value types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text exceeded the allowed length
    #[error("Text exceeds maximum length of {0} characters")]
    TooLong(usize),
}

/// Errors that can occur when parsing a slot time.
#[derive(Debug, thiserror::Error)]
pub enum SlotTimeError {
    /// The input did not match the strict 24-hour `HH:MM` format
    #[error("Time must be in 24-hour HH:MM format")]
    Format,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Maximum length of an appointment's reason-for-visit text.
pub const MAX_REASON_LEN: usize = 255;

/// Maximum length of an appointment's free-form notes at creation time.
pub const MAX_NOTES_LEN: usize = 500;

/// The reason-for-visit text attached to an appointment.
///
/// Required, trimmed, non-empty, and bounded to [`MAX_REASON_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitReason(NonEmptyText);

impl VisitReason {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        if text.as_str().chars().count() > MAX_REASON_LEN {
            return Err(TextError::TooLong(MAX_REASON_LEN));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_inner(self) -> String {
        self.0.into_inner()
    }
}

/// Optional free-form notes attached to an appointment, bounded to
/// [`MAX_NOTES_LEN`] characters. Unlike [`VisitReason`], empty input is valid
/// and normalised to `None` by [`VisitNotes::from_optional`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitNotes(String);

impl VisitNotes {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.chars().count() > MAX_NOTES_LEN {
            return Err(TextError::TooLong(MAX_NOTES_LEN));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Normalises an optional input: absent or blank notes become `None`.
    pub fn from_optional(input: Option<&str>) -> Result<Option<Self>, TextError> {
        match input {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => Self::new(s).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A booking slot time-of-day in strict 24-hour `HH:MM` format.
///
/// Seconds, fractional parts, and 12-hour clock suffixes are all rejected.
/// The canonical textual form (`Display`, serde) is always zero-padded
/// `HH:MM`, which keeps stored slot times directly comparable as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    /// Parses a strict `HH:MM` time string.
    pub fn parse(input: &str) -> Result<Self, SlotTimeError> {
        let bytes = input.as_bytes();
        // NaiveTime's %H:%M parser tolerates single-digit fields; the wire
        // format is fixed-width, so shape-check before parsing.
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(SlotTimeError::Format);
        }
        let time = NaiveTime::parse_from_str(input, "%H:%M").map_err(|_| SlotTimeError::Format)?;
        Ok(Self(time))
    }

    pub fn as_time(&self) -> NaiveTime {
        self.0
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl serde::Serialize for SlotTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for SlotTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SlotTime::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  hello ").unwrap().as_str(), "hello");
        assert!(NonEmptyText::new("   ").is_err());
        assert!(NonEmptyText::new("").is_err());
    }

    #[test]
    fn visit_reason_enforces_length_cap() {
        assert!(VisitReason::new("a".repeat(MAX_REASON_LEN)).is_ok());
        assert!(matches!(
            VisitReason::new("a".repeat(MAX_REASON_LEN + 1)),
            Err(TextError::TooLong(MAX_REASON_LEN))
        ));
    }

    #[test]
    fn visit_notes_normalises_blank_to_none() {
        assert!(VisitNotes::from_optional(None).unwrap().is_none());
        assert!(VisitNotes::from_optional(Some("  ")).unwrap().is_none());
        let notes = VisitNotes::from_optional(Some("follow-up")).unwrap().unwrap();
        assert_eq!(notes.as_str(), "follow-up");
        assert!(VisitNotes::from_optional(Some(&"n".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn slot_time_requires_strict_hh_mm() {
        assert_eq!(SlotTime::parse("09:30").unwrap().to_string(), "09:30");
        assert_eq!(SlotTime::parse("23:59").unwrap().to_string(), "23:59");
        assert!(SlotTime::parse("9:30").is_err());
        assert!(SlotTime::parse("09:30:00").is_err());
        assert!(SlotTime::parse("24:00").is_err());
        assert!(SlotTime::parse("09.30").is_err());
        assert!(SlotTime::parse("half past nine").is_err());
    }

    #[test]
    fn slot_time_round_trips_through_serde() {
        let time: SlotTime = serde_json::from_str("\"08:05\"").unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"08:05\"");
    }
}
