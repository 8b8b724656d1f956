use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

/// Column assigned to each terminal, keyed by terminal id.
pub type Positions = HashMap<String, usize>;

/// Rightmost column a terminal may occupy.
pub const MAX_COLUMN: usize = 4096;

/// Errors raised while turning physical distances into canvas columns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout has no terminals")]
    EmptyLayout,

    #[error("terminal '{0}' is not part of the layout")]
    UnknownTerminal(String),

    #[error("terminal '{0}' appears more than once in the layout")]
    DuplicateTerminal(String),

    #[error("no distance defined between '{left}' and '{right}'")]
    MissingDistance { left: String, right: String },

    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("'{left}' and '{right}' are {step} columns apart after scaling; terminals need at least 1")]
    NonPositiveStep { left: String, right: String, step: i64 },

    #[error("terminal '{terminal}' would land at column {offset}, left of the canvas")]
    OffCanvas { terminal: String, offset: i64 },

    #[error("terminal '{terminal}' would land at column {column}, past the widest supported canvas")]
    TooWide { terminal: String, column: usize },

    #[error("no label width defined for terminal '{0}'")]
    MissingLabelWidth(String),
}

/// Physical distances between adjacent terminals, in millimetres.
///
/// Entries are keyed by `(left, right)`; a lookup also matches an entry
/// stored the other way round.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    entries: HashMap<(String, String), f64>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, left: impl Into<String>, right: impl Into<String>, mm: f64) {
        self.entries.insert((left.into(), right.into()), mm);
    }

    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        self.entries
            .get(&(left.to_string(), right.to_string()))
            .or_else(|| self.entries.get(&(right.to_string(), left.to_string())))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L, R> FromIterator<(L, R, f64)> for DistanceTable
where
    L: Into<String>,
    R: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, R, f64)>>(iter: I) -> Self {
        let mut table = DistanceTable::new();
        for (left, right, mm) in iter {
            table.insert(left, right, mm);
        }
        table
    }
}

/// Scale a physical distance to whole columns.
///
/// Ties round to the even neighbour, so `7.5 -> 8` and `8.5 -> 8`.
pub fn scaled_step(mm: f64, scale: f64) -> i64 {
    (mm * scale).round_ties_even() as i64
}

/// Where the walk along the terminal order starts.
#[derive(Debug, Clone, Copy)]
pub struct Anchor<'a> {
    pub terminal: &'a str,
    pub column: usize,
}

/// Assign a column to every terminal.
///
/// The anchor terminal sits at `anchor.column`; the walk then moves outward
/// in both directions, one scaled distance per adjacent pair.
pub fn solve_positions(
    terminals: &[String],
    distances: &DistanceTable,
    scale: f64,
    anchor: Anchor<'_>,
) -> Result<Positions, LayoutError> {
    if terminals.is_empty() {
        return Err(LayoutError::EmptyLayout);
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(LayoutError::InvalidScale(scale));
    }

    let mut seen = HashSet::new();
    for id in terminals {
        if !seen.insert(id.as_str()) {
            return Err(LayoutError::DuplicateTerminal(id.clone()));
        }
    }

    let anchor_idx = terminals
        .iter()
        .position(|t| t == anchor.terminal)
        .ok_or_else(|| LayoutError::UnknownTerminal(anchor.terminal.to_string()))?;

    if anchor.column > MAX_COLUMN {
        return Err(LayoutError::TooWide {
            terminal: anchor.terminal.to_string(),
            column: anchor.column,
        });
    }

    let mut positions = Positions::with_capacity(terminals.len());
    positions.insert(anchor.terminal.to_string(), anchor.column);

    // Leftward from the anchor
    let mut pos = anchor.column as i64;
    for i in (0..anchor_idx).rev() {
        let (left, right) = (&terminals[i], &terminals[i + 1]);
        pos -= step_between(distances, left, right, scale)?;
        if pos < 0 {
            return Err(LayoutError::OffCanvas {
                terminal: left.clone(),
                offset: pos,
            });
        }
        positions.insert(left.clone(), pos as usize);
    }

    // Rightward from the anchor
    let mut pos = anchor.column;
    for i in anchor_idx + 1..terminals.len() {
        let (left, right) = (&terminals[i - 1], &terminals[i]);
        let step = step_between(distances, left, right, scale)? as usize;
        pos = pos
            .checked_add(step)
            .filter(|&col| col <= MAX_COLUMN)
            .ok_or_else(|| LayoutError::TooWide {
                terminal: right.clone(),
                column: pos.saturating_add(step),
            })?;
        positions.insert(right.clone(), pos);
    }

    debug!(
        terminals = terminals.len(),
        anchor = anchor.terminal,
        "solved terminal positions"
    );
    Ok(positions)
}

fn step_between(
    distances: &DistanceTable,
    left: &str,
    right: &str,
    scale: f64,
) -> Result<i64, LayoutError> {
    let mm = distances
        .get(left, right)
        .ok_or_else(|| LayoutError::MissingDistance {
            left: left.to_string(),
            right: right.to_string(),
        })?;
    let step = scaled_step(mm, scale);
    if step < 1 {
        return Err(LayoutError::NonPositiveStep {
            left: left.to_string(),
            right: right.to_string(),
            step,
        });
    }
    Ok(step)
}
