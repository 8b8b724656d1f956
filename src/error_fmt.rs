use std::fmt;
use std::io;

use owo_colors::OwoColorize;

use crate::config::ConfigError;
use crate::diagram::{LayoutError, RenderError};
use crate::firmware::{CertError, OtaError};

/// Application error with context for actionable error messages.
#[derive(Debug)]
pub enum AppError {
    /// IO error with context
    Io { context: String, source: io::Error },
    /// Layout file could not be loaded or solved
    Config { path: String, source: ConfigError },
    /// A connection set could not be drawn
    Render {
        path: String,
        set: String,
        source: RenderError,
    },
    /// Certificate embedding failed
    Cert(CertError),
    /// OTA packaging failed
    Ota(OtaError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io { context, source } => {
                write!(f, "{}", format_cli_error(&format!("{}: {}", context, source)))
            }
            AppError::Config { path, source } => write!(f, "{}", format_config_error(source, path)),
            AppError::Render { path, set, source } => {
                write!(f, "{}", format_render_error(source, set, path))
            }
            AppError::Cert(source) => write!(f, "{}", format_cert_error(source)),
            AppError::Ota(source) => write!(f, "{}", format_ota_error(source)),
        }
    }
}

impl std::error::Error for AppError {}

/// Extension trait to add layout file context to config results.
pub trait ConfigResultExt<T> {
    fn with_path(self, path: &str) -> Result<T, AppError>;
}

impl<T> ConfigResultExt<T> for Result<T, ConfigError> {
    fn with_path(self, path: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Config {
            path: path.to_string(),
            source: e,
        })
    }
}

/// Extension trait to add context to IO results.
pub trait IoResultExt<T> {
    fn with_context(self, context: &str) -> Result<T, AppError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn with_context(self, context: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Io {
            context: context.to_string(),
            source: e,
        })
    }
}

impl From<CertError> for AppError {
    fn from(e: CertError) -> Self {
        AppError::Cert(e)
    }
}

impl From<OtaError> for AppError {
    fn from(e: OtaError) -> Self {
        AppError::Ota(e)
    }
}

// ============================================================================
// Formatting functions (internal implementation)
// ============================================================================

fn format_cli_error(message: &str) -> String {
    format!("{}: {}\n", "error".red().bold(), message)
}

fn format_config_error(error: &ConfigError, path: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));

    match error {
        ConfigError::NotFound(_) => {
            out.push_str(&format!("layout file not found: {}\n", path.yellow()));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    1. Check the path passed to --layout\n");
            out.push_str(&format!(
                "    2. Start from the bundled layout: {}\n",
                "layouts/piste.yml".cyan()
            ));
        }
        ConfigError::Io(e) => {
            out.push_str(&format!("could not read {}: {}\n", path.cyan(), e));
        }
        ConfigError::Parse(yaml_err) => {
            out.push_str(&format!("invalid layout file {}\n", path.cyan()));
            out.push('\n');
            out.push_str(&format!("  {}\n", yaml_err.to_string().dimmed()));
        }
        ConfigError::UnknownLabelTerminal(id) => {
            out.push_str(&format!(
                "label width given for unknown terminal '{}'\n",
                id.yellow()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    1. Add '{}' to {} in {}\n",
                id.cyan(),
                "terminals".cyan(),
                path.cyan()
            ));
            out.push_str(&format!(
                "    2. Remove it from {}\n",
                "label_widths".cyan()
            ));
        }
        ConfigError::DuplicateSet(name) => {
            out.push_str(&format!(
                "connection set '{}' is defined more than once in {}\n",
                name.yellow(),
                path.cyan()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    Rename one of the sets so every name is unique\n");
        }
        ConfigError::UnknownSet(name) => {
            out.push_str(&format!(
                "no connection set named '{}' in {}\n",
                name.yellow(),
                path.cyan()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    Drop {} to render every set in the file\n",
                "--set".cyan()
            ));
        }
        ConfigError::Layout(layout_err) => {
            out.push_str(&format_layout_error(layout_err, path));
        }
    }

    out
}

fn format_layout_error(error: &LayoutError, path: &str) -> String {
    let mut out = format!("{}\n", error);

    let hint = match error {
        LayoutError::MissingDistance { left, right } => Some(format!(
            "Add {} to {} in {}",
            format!("[{}, {}, <mm>]", left, right).cyan(),
            "distances".cyan(),
            path.cyan()
        )),
        LayoutError::UnknownTerminal(id) => Some(format!(
            "Set {} to one of the terminals, or add '{}' to {}",
            "anchor".cyan(),
            id.cyan(),
            "terminals".cyan()
        )),
        LayoutError::NonPositiveStep { .. } => Some(format!(
            "Increase the distance or the {} so neighbours are at least one column apart",
            "scale".cyan()
        )),
        LayoutError::OffCanvas { .. } => Some(format!(
            "Increase {} or reduce {}",
            "center".cyan(),
            "scale".cyan()
        )),
        LayoutError::TooWide { .. } => Some(format!(
            "Check {} for a mistyped value, or reduce {}",
            "distances".cyan(),
            "scale".cyan()
        )),
        _ => None,
    };

    if let Some(hint) = hint {
        out.push('\n');
        out.push_str(&format!("  {}:\n", "To fix this".bold()));
        out.push_str(&format!("    {}\n", hint));
    }

    out
}

fn format_render_error(error: &RenderError, set: &str, path: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str(&format!(
        "cannot draw connection set '{}': {}\n",
        set.yellow(),
        error
    ));
    out.push('\n');

    match error {
        RenderError::UnknownTerminal(id) => {
            out.push_str(&format!(
                "  {}\n",
                format!("'{}' is not listed under terminals in {}", id, path).dimmed()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    1. Check the spelling of the terminal id\n");
            out.push_str(&format!(
                "    2. Add '{}' to {} along with its distances\n",
                id.cyan(),
                "terminals".cyan()
            ));
        }
        RenderError::SelfConnection(id) => {
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    Connect '{}' to a different terminal in set '{}'\n",
                id.cyan(),
                set.cyan()
            ));
        }
    }

    out
}

fn format_cert_error(error: &CertError) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: {}\n", "error".red().bold(), error));

    match error {
        CertError::InputNotFound(path) => {
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    1. Place the CA certificate at {}\n",
                path.display().to_string().cyan()
            ));
            out.push_str(&format!("    2. Pass another file with {}\n", "--input".cyan()));
        }
        CertError::InvalidIdentifier(_) => {
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "Variable names start with a letter or '_' and contain only letters, digits and '_'."
                    .dimmed()
            ));
        }
        _ => {}
    }

    out
}

fn format_ota_error(error: &OtaError) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));

    match error {
        OtaError::MissingInputs(paths) => {
            out.push_str("required binary not found, skipping merge\n");
            out.push('\n');
            for p in paths {
                out.push_str(&format!("  {} {}\n", "missing".dimmed(), p.display().to_string().yellow()));
            }
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str("    1. Build the firmware first\n");
            out.push_str(&format!(
                "    2. Check {} and {} match the build\n",
                "--env".cyan(),
                "--project-dir".cyan()
            ));
        }
        OtaError::Spawn { program, .. } => {
            out.push_str(&format!("{}\n", error));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    1. Install esptool: {}\n",
                "pip install esptool".cyan()
            ));
            out.push_str(&format!(
                "    2. Point {} at the executable (currently '{}')\n",
                "--esptool".cyan(),
                program
            ));
        }
        _ => out.push_str(&format!("{}\n", error)),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strip_ansi(s: &str) -> String {
        let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        re.replace_all(s, "").to_string()
    }

    #[test]
    fn test_format_missing_distance() {
        let err = AppError::Config {
            path: "layouts/piste.yml".to_string(),
            source: ConfigError::Layout(LayoutError::MissingDistance {
                left: "C_1".to_string(),
                right: "Piste".to_string(),
            }),
        };
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("error:"));
        assert!(stripped.contains("no distance defined between 'C_1' and 'Piste'"));
        assert!(stripped.contains("[C_1, Piste, <mm>]"));
        assert!(stripped.contains("layouts/piste.yml"));
        assert!(stripped.contains("To fix this"));
    }

    #[test]
    fn test_format_too_wide() {
        let err = AppError::Config {
            path: "layouts/piste.yml".to_string(),
            source: ConfigError::Layout(LayoutError::TooWide {
                terminal: "A_2".to_string(),
                column: 9000,
            }),
        };
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("terminal 'A_2' would land at column 9000"));
        assert!(stripped.contains("To fix this"));
        assert!(stripped.contains("distances"));
    }

    #[test]
    fn test_format_layout_not_found() {
        let err = AppError::Config {
            path: "nope.yml".to_string(),
            source: ConfigError::NotFound(PathBuf::from("nope.yml")),
        };
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("layout file not found: nope.yml"));
        assert!(stripped.contains("--layout"));
    }

    #[test]
    fn test_format_unknown_terminal_in_set() {
        let err = AppError::Render {
            path: "layouts/piste.yml".to_string(),
            set: "12_2b".to_string(),
            source: RenderError::UnknownTerminal("Z".to_string()),
        };
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("cannot draw connection set '12_2b'"));
        assert!(stripped.contains("unknown terminal 'Z'"));
        assert!(stripped.contains("Check the spelling"));
    }

    #[test]
    fn test_format_missing_ota_inputs() {
        let err = AppError::from(OtaError::MissingInputs(vec![
            PathBuf::from("bootloader/bootloader.bin"),
            PathBuf::from("partition_table/partition-table.bin"),
        ]));
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("required binary not found"));
        assert!(stripped.contains("missing bootloader/bootloader.bin"));
        assert!(stripped.contains("missing partition_table/partition-table.bin"));
    }

    #[test]
    fn test_format_cert_not_found() {
        let err = AppError::from(CertError::InputNotFound(PathBuf::from("certs/ca_cert.pem")));
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("certificate not found: certs/ca_cert.pem"));
        assert!(stripped.contains("--input"));
    }

    #[test]
    fn test_io_context() {
        let result: Result<(), io::Error> = Err(io::Error::other("disk full"));
        let err = result.with_context("failed to write stdout").unwrap_err();
        assert_eq!(
            strip_ansi(&err.to_string()),
            "error: failed to write stdout: disk full\n"
        );
    }
}
