//! Render command - draws connection sets from a layout file.

use std::io::Write;

use owo_colors::OwoColorize;
use tracing::info;

use crate::config::LayoutConfig;
use crate::diagram::{RenderedSet, draw_sets};
use crate::error_fmt::{AppError, ConfigResultExt, IoResultExt};

use super::expand_path;

/// Render the named sets (or all sets) of the layout at `path`.
pub fn render(path: &str, sets: &[String]) -> Result<(), AppError> {
    let file = expand_path(path);
    let config = LayoutConfig::load(&file).with_path(path)?;
    let layout = config.layout().with_path(path)?;
    let selected = config.select_sets(sets).with_path(path)?;

    if selected.is_empty() {
        println!("No connection sets in {}", path);
        return Ok(());
    }

    let rendered = draw_sets(&layout, &selected).map_err(|(set, source)| AppError::Render {
        path: path.to_string(),
        set,
        source,
    })?;
    info!(sets = rendered.len(), "rendered connection sets");

    let stdout = std::io::stdout();
    write_sets(&mut stdout.lock(), &rendered).with_context("failed to write diagram")
}

/// Write each set as a header line, its diagram, and a blank line.
pub fn write_sets<W: Write>(out: &mut W, rendered: &[RenderedSet]) -> std::io::Result<()> {
    for set in rendered {
        writeln!(out, "{}:", set.name.bold())?;
        for line in &set.lines {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;
    }
    out.flush()
}
