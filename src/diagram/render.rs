use thiserror::Error;
use tracing::debug;

use super::canvas::{BUS_ROW, Canvas, LABEL_ROW, MARGIN, RISER, RISER_ROW};
use super::layout::{Layout, Terminal};

/// Glyph sequence marking a resistor in a connector.
pub const RESISTOR_GLYPH: &str = "-R-";

const WIRE: char = '-';

/// A wire between two terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub resistor: bool,
}

impl Connection {
    pub fn plain(from: impl Into<String>, to: impl Into<String>) -> Self {
        Connection {
            from: from.into(),
            to: to.into(),
            resistor: false,
        }
    }

    pub fn resistor(from: impl Into<String>, to: impl Into<String>) -> Self {
        Connection {
            from: from.into(),
            to: to.into(),
            resistor: true,
        }
    }
}

/// A named group of connections drawn together as one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSet {
    pub name: String,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("connection references unknown terminal '{0}'")]
    UnknownTerminal(String),

    #[error("connection from '{0}' to itself")]
    SelfConnection(String),
}

/// A connection whose endpoints have been looked up in the layout.
struct Resolved<'a> {
    from: (usize, &'a Terminal),
    to: (usize, &'a Terminal),
    resistor: bool,
}

impl Resolved<'_> {
    fn is_adjacent(&self) -> bool {
        self.from.0.abs_diff(self.to.0) == 1
    }

    /// Columns of the left and right endpoint.
    fn span(&self) -> (usize, usize) {
        let (a, b) = (self.from.1.position, self.to.1.position);
        (a.min(b), a.max(b))
    }
}

fn resolve<'a>(layout: &'a Layout, conn: &Connection) -> Result<Resolved<'a>, RenderError> {
    let lookup = |id: &str| {
        layout
            .get(id)
            .ok_or_else(|| RenderError::UnknownTerminal(id.to_string()))
    };
    let from = lookup(&conn.from)?;
    let to = lookup(&conn.to)?;
    if from.0 == to.0 {
        return Err(RenderError::SelfConnection(conn.from.clone()));
    }
    Ok(Resolved {
        from,
        to,
        resistor: conn.resistor,
    })
}

/// Glyphs filling a gap of `gap` columns between two terminals.
///
/// A resistor is `-R-` centered in dashes, with any odd padding column on
/// the right. Gaps narrower than the marker still get the full `-R-`.
pub fn connector_glyphs(gap: usize, resistor: bool) -> Vec<char> {
    if !resistor {
        return vec![WIRE; gap];
    }

    let marker_len = RESISTOR_GLYPH.len();
    if gap <= marker_len {
        return RESISTOR_GLYPH.chars().collect();
    }

    let left = (gap - marker_len) / 2;
    let right = gap - marker_len - left;
    std::iter::repeat_n(WIRE, left)
        .chain(RESISTOR_GLYPH.chars())
        .chain(std::iter::repeat_n(WIRE, right))
        .collect()
}

/// Draw the terminals of `layout` and the given connections.
///
/// Returns one line per canvas row with trailing blanks trimmed. Every
/// connection is checked before drawing starts, so a bad endpoint yields
/// an error and no lines.
pub fn draw_diagram(layout: &Layout, connections: &[Connection]) -> Result<Vec<String>, RenderError> {
    let resolved = connections
        .iter()
        .map(|c| resolve(layout, c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut canvas = Canvas::new(layout.max_position() + MARGIN);

    for terminal in layout.terminals() {
        let start = terminal.label_start();
        for (i, ch) in terminal.id.chars().enumerate() {
            canvas.put(LABEL_ROW, start + i as i64, ch);
        }
    }

    for conn in &resolved {
        let (left, right) = conn.span();
        let glyphs = connector_glyphs(right - left - 1, conn.resistor);
        let first = left as i64 + 1;

        if conn.is_adjacent() {
            for (i, &ch) in glyphs.iter().enumerate() {
                let col = first + i as i64;
                // Labels win over wire
                if layout.terminals().iter().any(|t| t.covers(col)) {
                    continue;
                }
                canvas.put(LABEL_ROW, col, ch);
            }
        } else {
            for end in [conn.from.1.position, conn.to.1.position] {
                canvas.put(RISER_ROW, end as i64, RISER);
                canvas.put(BUS_ROW, end as i64, RISER);
            }
            for (i, &ch) in glyphs.iter().enumerate() {
                canvas.put(BUS_ROW, first + i as i64, ch);
            }
        }
    }

    debug!(
        connections = connections.len(),
        width = canvas.width(),
        "drew diagram"
    );
    Ok(canvas.into_lines())
}

/// A connection set after drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSet {
    pub name: String,
    pub lines: Vec<String>,
}

/// Draw each set in order. Fails on the first set with a bad connection.
pub fn draw_sets(layout: &Layout, sets: &[ConnectionSet]) -> Result<Vec<RenderedSet>, (String, RenderError)> {
    sets.iter()
        .map(|set| {
            draw_diagram(layout, &set.connections)
                .map(|lines| RenderedSet {
                    name: set.name.clone(),
                    lines,
                })
                .map_err(|e| (set.name.clone(), e))
        })
        .collect()
}
