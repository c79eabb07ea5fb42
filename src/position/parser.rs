//! Phrase to coordinate resolution.

use std::sync::OnceLock;

use regex::Regex;

use super::grid::{self, Column, GridAnchor, Row};
use super::{Confidence, FieldKind, FieldSize, PageSize, Placement, MARGIN};

/// Vertical position assumed for reference text, as a fraction of page height.
const REFERENCE_TEXT_Y_RATIO: f64 = 0.3;

/// Resolves a placement phrase for a field of the given kind.
#[must_use]
pub fn parse_position(
    description: &str,
    kind: FieldKind,
    page: PageSize,
    reference_text: Option<&str>,
) -> Placement {
    parse_position_sized(description, kind.size(), page, reference_text)
}

/// Resolves a placement phrase for a field with an explicit box size.
#[must_use]
pub fn parse_position_sized(
    description: &str,
    size: FieldSize,
    page: PageSize,
    reference_text: Option<&str>,
) -> Placement {
    let normalised = normalise(description);

    if let Some((name, anchor)) = grid::match_normalised(&normalised) {
        let (x, y) = anchor.locate(size, page);
        return Placement {
            x,
            y,
            confidence: Confidence::High,
            explanation: Some(format!("Positioned at {}", name.replace('-', " "))),
        };
    }

    if let Some(reference) = reference_text.filter(|r| !r.trim().is_empty()) {
        if let Some(placement) = relative_to_text(description, reference, size, page) {
            return placement;
        }
    }

    if let Some(placement) = directional(description, size, page) {
        return placement;
    }

    let (x, y) = GridAnchor {
        column: Column::Center,
        row: Row::Bottom,
    }
    .locate(size, page);

    Placement {
        x,
        y,
        confidence: Confidence::Low,
        explanation: Some("Could not parse position, using default: bottom center".to_string()),
    }
}

/// Returns true when the box lies entirely within the page.
#[must_use]
pub fn validate_coordinates(x: f64, y: f64, size: FieldSize, page: PageSize) -> bool {
    x >= 0.0 && y >= 0.0 && x + size.width <= page.width && y + size.height <= page.height
}

fn filler_words() -> Option<&'static Regex> {
    static FILLER: OnceLock<Option<Regex>> = OnceLock::new();
    FILLER
        .get_or_init(|| Regex::new(r"\b(?:at|in|on)\s+the\b").ok())
        .as_ref()
}

/// Lowercases, drops "at the" style filler and joins words with hyphens.
fn normalise(description: &str) -> String {
    let lowered = description.trim().to_lowercase();
    let stripped = match filler_words() {
        Some(re) => re.replace_all(&lowered, " ").into_owned(),
        None => lowered,
    };
    stripped.split_whitespace().collect::<Vec<_>>().join("-")
}

fn relative_to_text(
    description: &str,
    reference: &str,
    size: FieldSize,
    page: PageSize,
) -> Option<Placement> {
    let lowered = description.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    let text_y = page.height * REFERENCE_TEXT_Y_RATIO;
    let text_width = 2.0f64.mul_add(-MARGIN, page.width);

    let (x, y, relation) = if has_any(&["below", "under", "beneath"]) {
        (MARGIN, text_y + 40.0, "below")
    } else if has_any(&["above", "over"]) {
        (MARGIN, text_y - size.height - 20.0, "above")
    } else if has_any(&["left of", "to the left"]) {
        (MARGIN - size.width - 20.0, text_y, "to the left of")
    } else if has_any(&["right of", "to the right"]) {
        (MARGIN + text_width + 20.0, text_y, "to the right of")
    } else if has_any(&["in line with", "inline", "same line"]) {
        (MARGIN + text_width + 10.0, text_y, "in line with")
    } else {
        return None;
    };

    Some(Placement {
        x: x.round(),
        y: y.round(),
        confidence: Confidence::Medium,
        explanation: Some(format!("Positioned {relation} \"{reference}\"")),
    })
}

/// Scans each axis on its own. A missing axis sits at the page centre.
fn directional(description: &str, size: FieldSize, page: PageSize) -> Option<Placement> {
    let lowered = description.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    let row = if has_any(&["top", "upper", "above"]) {
        Some(Row::Top)
    } else if has_any(&["bottom", "lower", "below"]) {
        Some(Row::Bottom)
    } else if has_any(&["middle", "center", "centre"]) {
        Some(Row::Middle)
    } else {
        None
    };

    let column = if has_any(&["left"]) {
        Some(Column::Left)
    } else if has_any(&["right"]) {
        Some(Column::Right)
    } else if has_any(&["center", "centre", "middle"]) {
        Some(Column::Center)
    } else {
        None
    };

    if row.is_none() && column.is_none() {
        return None;
    }

    let (x, y) = GridAnchor {
        column: column.unwrap_or(Column::Center),
        row: row.unwrap_or(Row::Middle),
    }
    .locate(size, page);

    Some(Placement {
        x,
        y,
        confidence: Confidence::Medium,
        explanation: Some("Positioned using directional keywords".to_string()),
    })
}
