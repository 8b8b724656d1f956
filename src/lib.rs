pub mod commands;
pub mod config;
pub mod diagram;
pub mod error_fmt;
pub mod firmware;

// Re-export commonly used types for convenience
pub use config::{ConfigError, LayoutConfig};
pub use diagram::{
    Anchor, Connection, ConnectionSet, DistanceTable, Layout, LayoutError, RenderError, Terminal, draw_diagram,
    solve_positions,
};
pub use error_fmt::AppError;
