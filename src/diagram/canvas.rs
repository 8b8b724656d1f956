/// Number of rows in every diagram.
pub const ROWS: usize = 4;

/// Blank columns added right of the last terminal.
pub const MARGIN: usize = 10;

/// Labels and connectors between adjacent terminals.
pub const LABEL_ROW: usize = 0;
/// Upper half of the risers for bus connectors.
pub const RISER_ROW: usize = 1;
/// Lower half of the risers, plus the bus connectors themselves.
pub const BUS_ROW: usize = 2;

pub const RISER: char = '|';

/// Fixed-height character grid that a single diagram is drawn onto.
#[derive(Debug, Clone)]
pub struct Canvas {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl Canvas {
    /// Create a blank canvas `width` columns wide.
    pub fn new(width: usize) -> Self {
        Canvas {
            rows: vec![vec![' '; width]; ROWS],
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Write `ch` at (`row`, `col`). Cells off the canvas are dropped.
    pub fn put(&mut self, row: usize, col: i64, ch: char) {
        if col < 0 {
            return;
        }
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col as usize)) {
            *cell = ch;
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Flatten to one string per row with trailing blanks removed.
    pub fn into_lines(self) -> Vec<String> {
        self.rows
            .into_iter()
            .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}
