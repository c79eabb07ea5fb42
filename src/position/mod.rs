//! Natural-language field placement.
//!
//! Turns phrases such as "bottom right" or "below the title" into page
//! coordinates for a signing field. Coordinates use a top-left origin on a
//! US Letter page (612 × 792 points) with a 50 point margin on every edge.
//!
//! Resolution order, first match wins:
//!
//! 1. **Grid names** ("top-left", "lower right", "centre"): high confidence
//! 2. **Relative to reference text** ("below", "to the right of"), only when
//!    the caller supplies the reference text: medium confidence
//! 3. **Directional keywords** scanned per axis ("near the top, left"):
//!    medium confidence
//! 4. **Default** bottom-centre: low confidence, with an explanation
//!
//! Parsing never fails; callers decide what to do with low confidence.
//!
//! # Example
//!
//! ```
//! use wesign_mcp::position::{parse_position, Confidence, FieldKind, PageSize};
//!
//! let placement = parse_position("bottom right", FieldKind::Signature, PageSize::LETTER, None);
//! assert_eq!((placement.x, placement.y), (362.0, 692.0));
//! assert_eq!(placement.confidence, Confidence::High);
//! ```

mod grid;
mod parser;

pub use grid::{Column, GridAnchor, Row};
pub use parser::{parse_position, parse_position_sized, validate_coordinates};

use std::fmt;

use serde::Serialize;

/// Distance kept between generated fields and every page edge, in points.
pub const MARGIN: f64 = 50.0;

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
}

impl PageSize {
    /// US Letter, the page size WeSign lays fields out against.
    pub const LETTER: Self = Self {
        width: 612.0,
        height: 792.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Field dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSize {
    /// Field width.
    pub width: f64,
    /// Field height.
    pub height: f64,
}

impl FieldSize {
    /// Creates a size from width and height.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The kind of field being placed. Determines the default box size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Signature box, 200 × 50.
    #[default]
    Signature,
    /// Initials box, 100 × 30.
    Initials,
    /// Date box, 150 × 30.
    Date,
    /// Free text box, 200 × 30.
    Text,
    /// Checkbox, 20 × 20.
    Checkbox,
}

impl FieldKind {
    /// Parses a field type name. Unknown names fall back to [`FieldKind::Signature`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "initials" | "initial" => Self::Initials,
            "date" => Self::Date,
            "text" => Self::Text,
            "checkbox" => Self::Checkbox,
            _ => Self::Signature,
        }
    }

    /// Maps the upstream numeric field type (1..=5) to a kind.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Signature),
            2 => Some(Self::Initials),
            3 => Some(Self::Text),
            4 => Some(Self::Date),
            5 => Some(Self::Checkbox),
            _ => None,
        }
    }

    /// Upstream numeric field type.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Signature => 1,
            Self::Initials => 2,
            Self::Text => 3,
            Self::Date => 4,
            Self::Checkbox => 5,
        }
    }

    /// Default box size for this kind.
    #[must_use]
    pub const fn size(self) -> FieldSize {
        match self {
            Self::Signature => FieldSize::new(200.0, 50.0),
            Self::Initials => FieldSize::new(100.0, 30.0),
            Self::Date => FieldSize::new(150.0, 30.0),
            Self::Text => FieldSize::new(200.0, 30.0),
            Self::Checkbox => FieldSize::new(20.0, 20.0),
        }
    }

    /// Human-readable label used in tool responses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Signature => "Signature",
            Self::Initials => "Initial",
            Self::Text => "Text",
            Self::Date => "Date",
            Self::Checkbox => "Checkbox",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Signature => "signature",
            Self::Initials => "initials",
            Self::Date => "date",
            Self::Text => "text",
            Self::Checkbox => "checkbox",
        };
        f.write_str(name)
    }
}

/// How sure the parser is about a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Matched a named grid position.
    High,
    /// Matched relative or directional wording.
    Medium,
    /// Nothing matched; the default position was used.
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(name)
    }
}

/// A resolved field position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Distance from the left edge.
    pub x: f64,
    /// Distance from the top edge.
    pub y: f64,
    /// Match strength.
    pub confidence: Confidence,
    /// What the parser matched, for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_falls_back_to_signature() {
        assert_eq!(FieldKind::from_name("stamp"), FieldKind::Signature);
        assert_eq!(FieldKind::from_name("Initials"), FieldKind::Initials);
        assert_eq!(FieldKind::from_name(" checkbox "), FieldKind::Checkbox);
    }

    #[test]
    fn field_codes_match_upstream_numbering() {
        for code in 1..=5 {
            let kind = FieldKind::from_code(code).unwrap();
            assert_eq!(i64::from(kind.code()), code);
        }
        assert!(FieldKind::from_code(0).is_none());
        assert!(FieldKind::from_code(6).is_none());
    }

    #[test]
    fn preset_sizes() {
        assert_eq!(FieldKind::Signature.size(), FieldSize::new(200.0, 50.0));
        assert_eq!(FieldKind::Initials.size(), FieldSize::new(100.0, 30.0));
        assert_eq!(FieldKind::Date.size(), FieldSize::new(150.0, 30.0));
        assert_eq!(FieldKind::Text.size(), FieldSize::new(200.0, 30.0));
        assert_eq!(FieldKind::Checkbox.size(), FieldSize::new(20.0, 20.0));
    }

    #[test]
    fn confidence_serialises_lowercase() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, r#""medium""#);
    }
}
