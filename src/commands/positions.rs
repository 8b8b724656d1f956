//! Positions command - prints the solved column of every terminal.

use owo_colors::OwoColorize;

use crate::config::LayoutConfig;
use crate::diagram::Layout;
use crate::error_fmt::{AppError, ConfigResultExt};

use super::expand_path;

/// Print each terminal with its column and label width.
pub fn positions(path: &str) -> Result<(), AppError> {
    let config = LayoutConfig::load(&expand_path(path)).with_path(path)?;
    let layout = config.layout().with_path(path)?;
    print!("{}", format_positions(&layout, &config.anchor));
    Ok(())
}

fn format_positions(layout: &Layout, anchor: &str) -> String {
    let id_width = layout
        .terminals()
        .iter()
        .map(|t| t.id.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for t in layout.terminals() {
        let id = format!("{:id_width$}", t.id);
        let id = if t.id == anchor {
            id.bold().to_string()
        } else {
            id
        };
        out.push_str(&format!("{}  {:>4}  {}\n", id, t.position, format!("w={}", t.label_width).dimmed()));
    }
    out
}
