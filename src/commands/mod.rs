//! CLI command implementations.
//!
//! Each command is implemented in its own submodule and returns an
//! `AppError` that `main` prints.

mod embed_cert;
mod flags;
mod merge_ota;
mod positions;
mod render;

pub use embed_cert::embed_cert;
pub use flags::flags;
pub use merge_ota::merge_ota;
pub use positions::positions;
pub use render::{render, write_sets};

use std::path::PathBuf;

/// Expand a leading `~` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
