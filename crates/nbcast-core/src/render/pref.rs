//! Render preferences and their specificity ranking.

use std::cmp::Ordering;

use super::wildcard;
use crate::schema::{Cell, CellType};

/// A matching rule binding cells to a render function.
///
/// Either axis may be left out to wildcard over it, and the mime pattern may
/// contain `*` wildcards that match within a single `/`-delimited segment.
/// A broad base rule (say `mime_type: "text/*"`) can later be narrowed by a
/// more specific registration without either party knowing about the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pref {
    /// Cell type to match; `None` matches every type.
    pub cell_type: Option<CellType>,
    /// Mime-type pattern to match; `None` matches every mime-type.
    pub mime_type: Option<String>,
}

impl Pref {
    /// A preference matching every cell of `cell_type`.
    #[must_use]
    pub fn for_type(cell_type: CellType) -> Self {
        Self {
            cell_type: Some(cell_type),
            mime_type: None,
        }
    }

    /// A preference matching every cell whose mime-type glob-matches
    /// `pattern`.
    #[must_use]
    pub fn for_mime_type(pattern: impl Into<String>) -> Self {
        Self {
            cell_type: None,
            mime_type: Some(pattern.into()),
        }
    }

    /// Whether this preference captures `cell`: each present axis must
    /// match, absent axes match anything.
    #[must_use]
    pub fn matches(&self, cell: &Cell) -> bool {
        if let Some(cell_type) = self.cell_type {
            if cell_type != cell.cell_type() {
                return false;
            }
        }
        if let Some(pattern) = &self.mime_type {
            if !wildcard::matches(pattern, cell.mime_type()) {
                return false;
            }
        }
        true
    }
}

/// Order two preferences by specificity; `Ordering::Greater` means `a` is
/// the more specific rule.
///
/// Ranking, most significant first: an exact mime pattern outranks a
/// wildcarded one outranks an absent one; among wildcarded patterns, fewer
/// wildcard characters ranks higher; a preference constraining both axes
/// outranks one constraining one, which outranks one constraining neither.
/// Equal specificity is a tie; the dispatch loop resolves it in favor of
/// the later registration.
pub(crate) fn compare_specificity(a: &Pref, b: &Pref) -> Ordering {
    rank(a).cmp(&rank(b))
}

/// Scalar specificity score, compared lexicographically.
fn rank(pref: &Pref) -> (u8, isize, u8) {
    let mime_rank = match &pref.mime_type {
        Some(pattern) if wildcard::count(pattern) == 0 => (2, 0),
        // More wildcards, less specific.
        Some(pattern) => (1, -(wildcard::count(pattern) as isize)),
        None => (0, 0),
    };
    let axes = u8::from(pref.cell_type.is_some()) + u8::from(pref.mime_type.is_some());
    (mime_rank.0, mime_rank.1, axes)
}
