//! Named grid positions.

use super::{FieldSize, PageSize, MARGIN};

/// Horizontal anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Flush with the left margin.
    Left,
    /// Horizontally centred.
    Center,
    /// Flush with the right margin.
    Right,
}

/// Vertical anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    /// Flush with the top margin.
    Top,
    /// Vertically centred.
    Middle,
    /// Flush with the bottom margin.
    Bottom,
}

/// A cell of the 3 × 3 placement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridAnchor {
    /// Horizontal anchor.
    pub column: Column,
    /// Vertical anchor.
    pub row: Row,
}

impl GridAnchor {
    const fn new(row: Row, column: Column) -> Self {
        Self { column, row }
    }

    /// Top-left corner of a box of `size` anchored at this cell, rounded to
    /// whole points.
    #[must_use]
    pub fn locate(self, size: FieldSize, page: PageSize) -> (f64, f64) {
        let x = match self.column {
            Column::Left => MARGIN,
            Column::Center => (page.width - size.width) / 2.0,
            Column::Right => page.width - MARGIN - size.width,
        };
        let y = match self.row {
            Row::Top => MARGIN,
            Row::Middle => (page.height - size.height) / 2.0,
            Row::Bottom => page.height - MARGIN - size.height,
        };
        (x.round(), y.round())
    }

    /// Looks up a grid name exactly as written in the table.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        GRID.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, anchor)| *anchor)
    }
}

const GRID: [(&str, GridAnchor); 29] = [
    ("top-left", GridAnchor::new(Row::Top, Column::Left)),
    ("top-center", GridAnchor::new(Row::Top, Column::Center)),
    ("top-centre", GridAnchor::new(Row::Top, Column::Center)),
    ("top-middle", GridAnchor::new(Row::Top, Column::Center)),
    ("top-right", GridAnchor::new(Row::Top, Column::Right)),
    ("upper-left", GridAnchor::new(Row::Top, Column::Left)),
    ("upper-center", GridAnchor::new(Row::Top, Column::Center)),
    ("upper-right", GridAnchor::new(Row::Top, Column::Right)),
    ("middle-left", GridAnchor::new(Row::Middle, Column::Left)),
    ("middle-center", GridAnchor::new(Row::Middle, Column::Center)),
    ("middle-centre", GridAnchor::new(Row::Middle, Column::Center)),
    ("middle-right", GridAnchor::new(Row::Middle, Column::Right)),
    ("center-left", GridAnchor::new(Row::Middle, Column::Left)),
    ("center-center", GridAnchor::new(Row::Middle, Column::Center)),
    ("center-right", GridAnchor::new(Row::Middle, Column::Right)),
    ("centre", GridAnchor::new(Row::Middle, Column::Center)),
    ("center", GridAnchor::new(Row::Middle, Column::Center)),
    ("bottom-left", GridAnchor::new(Row::Bottom, Column::Left)),
    ("bottom-center", GridAnchor::new(Row::Bottom, Column::Center)),
    ("bottom-centre", GridAnchor::new(Row::Bottom, Column::Center)),
    ("bottom-middle", GridAnchor::new(Row::Bottom, Column::Center)),
    ("bottom-right", GridAnchor::new(Row::Bottom, Column::Right)),
    ("lower-left", GridAnchor::new(Row::Bottom, Column::Left)),
    ("lower-center", GridAnchor::new(Row::Bottom, Column::Center)),
    ("lower-right", GridAnchor::new(Row::Bottom, Column::Right)),
    ("top", GridAnchor::new(Row::Top, Column::Center)),
    ("bottom", GridAnchor::new(Row::Bottom, Column::Center)),
    ("left", GridAnchor::new(Row::Middle, Column::Left)),
    ("right", GridAnchor::new(Row::Middle, Column::Right)),
];

/// Finds the longest grid name present in a normalised (hyphen-joined)
/// phrase.
///
/// Compound names match on hyphen boundaries anywhere in the phrase. Single
/// words match only the whole phrase, so "top-and-left" is not a grid hit.
pub(super) fn match_normalised(phrase: &str) -> Option<(&'static str, GridAnchor)> {
    let padded = format!("-{phrase}-");

    let mut keys: Vec<&(&'static str, GridAnchor)> = GRID.iter().collect();
    keys.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));

    keys.into_iter()
        .find(|(key, _)| {
            if key.contains('-') {
                padded.contains(&format!("-{key}-"))
            } else {
                phrase == *key
            }
        })
        .map(|(key, anchor)| (*key, *anchor))
}
