pub mod canvas;
pub mod layout;
pub mod positions;
pub mod render;

// Re-export types for convenience
pub use canvas::{Canvas, MARGIN, ROWS};
pub use layout::{Layout, Terminal};
pub use positions::{Anchor, DistanceTable, LayoutError, MAX_COLUMN, Positions, scaled_step, solve_positions};
pub use render::{
    Connection, ConnectionSet, RESISTOR_GLYPH, RenderError, RenderedSet, connector_glyphs, draw_diagram, draw_sets,
};
