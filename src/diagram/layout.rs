use std::collections::HashMap;

use super::positions::{Anchor, DistanceTable, LayoutError, MAX_COLUMN, Positions, solve_positions};

/// A terminal placed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub id: String,
    pub label_width: usize,
    pub position: usize,
}

impl Terminal {
    /// First column of the label, which may be left of the canvas.
    pub fn label_start(&self) -> i64 {
        self.position as i64 - (self.label_width / 2) as i64
    }

    /// Whether `col` falls inside this terminal's label span.
    pub fn covers(&self, col: i64) -> bool {
        let start = self.label_start();
        start <= col && col < start + self.label_width as i64
    }
}

/// Terminals in display order, with their solved columns.
#[derive(Debug, Clone)]
pub struct Layout {
    terminals: Vec<Terminal>,
    index: HashMap<String, usize>,
}

impl Layout {
    /// Assemble a layout from already-solved positions.
    ///
    /// Every terminal in `order` needs an entry in both `positions` and
    /// `label_widths`, and columns must increase along the order.
    pub fn from_parts(
        order: &[String],
        positions: &Positions,
        label_widths: &HashMap<String, usize>,
    ) -> Result<Self, LayoutError> {
        if order.is_empty() {
            return Err(LayoutError::EmptyLayout);
        }

        let mut terminals: Vec<Terminal> = Vec::with_capacity(order.len());
        let mut index = HashMap::with_capacity(order.len());

        for id in order {
            let position = *positions
                .get(id)
                .ok_or_else(|| LayoutError::UnknownTerminal(id.clone()))?;
            let label_width = *label_widths
                .get(id)
                .ok_or_else(|| LayoutError::MissingLabelWidth(id.clone()))?;

            if position > MAX_COLUMN {
                return Err(LayoutError::TooWide {
                    terminal: id.clone(),
                    column: position,
                });
            }
            if index.contains_key(id) {
                return Err(LayoutError::DuplicateTerminal(id.clone()));
            }
            if let Some(prev) = terminals.last() {
                if position <= prev.position {
                    return Err(LayoutError::NonPositiveStep {
                        left: prev.id.clone(),
                        right: id.clone(),
                        step: position as i64 - prev.position as i64,
                    });
                }
            }

            index.insert(id.clone(), terminals.len());
            terminals.push(Terminal {
                id: id.clone(),
                label_width,
                position,
            });
        }

        Ok(Layout { terminals, index })
    }

    /// Solve positions from physical distances and build the layout.
    pub fn solve(
        order: &[String],
        distances: &DistanceTable,
        scale: f64,
        anchor: Anchor<'_>,
        label_widths: &HashMap<String, usize>,
    ) -> Result<Self, LayoutError> {
        let positions = solve_positions(order, distances, scale, anchor)?;
        Self::from_parts(order, &positions, label_widths)
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Look up a terminal and its index in the display order.
    pub fn get(&self, id: &str) -> Option<(usize, &Terminal)> {
        self.index.get(id).map(|&i| (i, &self.terminals[i]))
    }

    pub fn max_position(&self) -> usize {
        self.terminals.last().map(|t| t.position).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn widths(entries: &[(&str, usize)]) -> HashMap<String, usize> {
        entries.iter().map(|(k, w)| (k.to_string(), *w)).collect()
    }

    fn positions(entries: &[(&str, usize)]) -> Positions {
        entries.iter().map(|(k, p)| (k.to_string(), *p)).collect()
    }

    #[test]
    fn test_from_parts_keeps_order() {
        let layout = Layout::from_parts(
            &ids(&["A", "B"]),
            &positions(&[("A", 10), ("B", 20)]),
            &widths(&[("A", 1), ("B", 1)]),
        )
        .unwrap();

        assert_eq!(layout.len(), 2);
        assert_eq!(layout.max_position(), 20);
        let (idx, b) = layout.get("B").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(b.position, 20);
        assert!(layout.get("Z").is_none());
    }

    #[test]
    fn test_from_parts_missing_position() {
        let err = Layout::from_parts(
            &ids(&["A", "B"]),
            &positions(&[("A", 10)]),
            &widths(&[("A", 1), ("B", 1)]),
        )
        .unwrap_err();

        assert_eq!(err, LayoutError::UnknownTerminal("B".to_string()));
    }

    #[test]
    fn test_from_parts_missing_label_width() {
        let err = Layout::from_parts(
            &ids(&["A", "B"]),
            &positions(&[("A", 10), ("B", 20)]),
            &widths(&[("A", 1)]),
        )
        .unwrap_err();

        assert_eq!(err, LayoutError::MissingLabelWidth("B".to_string()));
    }

    #[test]
    fn test_from_parts_rejects_non_increasing() {
        let err = Layout::from_parts(
            &ids(&["A", "B"]),
            &positions(&[("A", 20), ("B", 20)]),
            &widths(&[("A", 1), ("B", 1)]),
        )
        .unwrap_err();

        assert!(matches!(err, LayoutError::NonPositiveStep { step: 0, .. }));
    }

    #[test]
    fn test_from_parts_rejects_columns_past_canvas() {
        let err = Layout::from_parts(
            &ids(&["A", "B"]),
            &positions(&[("A", 10), ("B", usize::MAX - 40)]),
            &widths(&[("A", 1), ("B", 1)]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            LayoutError::TooWide {
                terminal: "B".to_string(),
                column: usize::MAX - 40
            }
        );
    }

    #[test]
    fn test_label_span() {
        let piste = Terminal {
            id: "Piste".to_string(),
            label_width: 5,
            position: 50,
        };
        assert_eq!(piste.label_start(), 48);
        assert!(!piste.covers(47));
        assert!(piste.covers(48));
        assert!(piste.covers(52));
        assert!(!piste.covers(53));

        let near_edge = Terminal {
            id: "A_1".to_string(),
            label_width: 3,
            position: 0,
        };
        assert_eq!(near_edge.label_start(), -1);
    }

    #[test]
    fn test_solve() {
        let distances: DistanceTable = [("A", "B", 15.0), ("B", "C", 20.0)].into_iter().collect();
        let layout = Layout::solve(
            &ids(&["A", "B", "C"]),
            &distances,
            0.5,
            Anchor { terminal: "B", column: 50 },
            &widths(&[("A", 1), ("B", 1), ("C", 1)]),
        )
        .unwrap();

        let columns: Vec<usize> = layout.terminals().iter().map(|t| t.position).collect();
        assert_eq!(columns, vec![42, 50, 60]);
    }
}
