//! Layout files describing the terminals of a wiring diagram.
//!
//! A layout file is YAML. It lists the terminals in display order, the
//! physical distances between neighbours, and any number of named
//! connection sets to draw against that layout.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::diagram::{Anchor, Connection, ConnectionSet, DistanceTable, Layout, LayoutError};

/// Marker accepted in the short `[from, to, R]` connection form.
pub const RESISTOR_MARKER: &str = "R";

fn default_anchor() -> String {
    "Piste".to_string()
}

fn default_center() -> usize {
    50
}

fn default_scale() -> f64 {
    0.5
}

/// One `[left, right, millimetres]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(String, String, f64)")]
pub struct DistanceEntry {
    pub left: String,
    pub right: String,
    pub mm: f64,
}

impl From<(String, String, f64)> for DistanceEntry {
    fn from((left, right, mm): (String, String, f64)) -> Self {
        DistanceEntry { left, right, mm }
    }
}

/// Accepted spellings of a connection in a layout file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawConnection {
    Pair(String, String),
    Marked(String, String, String),
    Full {
        from: String,
        to: String,
        #[serde(default)]
        resistor: bool,
    },
}

/// A connection as written in a layout file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConnection")]
pub struct ConnectionEntry(pub Connection);

impl TryFrom<RawConnection> for ConnectionEntry {
    type Error = String;

    fn try_from(raw: RawConnection) -> Result<Self, Self::Error> {
        let conn = match raw {
            RawConnection::Pair(from, to) => Connection::plain(from, to),
            RawConnection::Marked(from, to, marker) => {
                if marker != RESISTOR_MARKER {
                    return Err(format!(
                        "unknown connection marker '{}' between '{}' and '{}', expected '{}'",
                        marker, from, to, RESISTOR_MARKER
                    ));
                }
                Connection::resistor(from, to)
            }
            RawConnection::Full { from, to, resistor } => Connection { from, to, resistor },
        };
        Ok(ConnectionEntry(conn))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSetConfig {
    pub name: String,
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
}

impl From<&ConnectionSetConfig> for ConnectionSet {
    fn from(set: &ConnectionSetConfig) -> Self {
        ConnectionSet {
            name: set.name.clone(),
            connections: set.connections.iter().map(|c| c.0.clone()).collect(),
        }
    }
}

/// A parsed layout file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Terminal ids, left to right.
    pub terminals: Vec<String>,

    /// Terminal pinned to `center`. Default: `Piste`.
    #[serde(default = "default_anchor")]
    pub anchor: String,

    /// Column of the anchor terminal. Default: 50.
    #[serde(default = "default_center")]
    pub center: usize,

    /// Characters per millimetre. Default: 0.5.
    #[serde(default = "default_scale")]
    pub scale: f64,

    #[serde(default)]
    pub distances: Vec<DistanceEntry>,

    /// Label width overrides; unlisted terminals use their id length.
    #[serde(default)]
    pub label_widths: BTreeMap<String, usize>,

    #[serde(default)]
    pub connection_sets: Vec<ConnectionSetConfig>,
}

/// Errors that can occur when loading or using a layout file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("layout file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read layout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse layout file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("label width given for unknown terminal '{0}'")]
    UnknownLabelTerminal(String),

    #[error("connection set '{0}' is defined more than once")]
    DuplicateSet(String),

    #[error("no connection set named '{0}'")]
    UnknownSet(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl LayoutConfig {
    /// Load a layout file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let config = Self::from_yaml(&content)?;
        debug!(
            path = %path.display(),
            terminals = config.terminals.len(),
            sets = config.connection_sets.len(),
            "loaded layout file"
        );
        Ok(config)
    }

    /// Parse and validate a layout from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross references that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let known: HashSet<&str> = self.terminals.iter().map(String::as_str).collect();
        for id in self.label_widths.keys() {
            if !known.contains(id.as_str()) {
                return Err(ConfigError::UnknownLabelTerminal(id.clone()));
            }
        }

        let mut names = HashSet::new();
        for set in &self.connection_sets {
            if !names.insert(set.name.as_str()) {
                return Err(ConfigError::DuplicateSet(set.name.clone()));
            }
        }
        Ok(())
    }

    pub fn distance_table(&self) -> DistanceTable {
        self.distances
            .iter()
            .map(|d| (d.left.clone(), d.right.clone(), d.mm))
            .collect()
    }

    /// Label width of every terminal, falling back to the id's length.
    pub fn label_widths(&self) -> HashMap<String, usize> {
        self.terminals
            .iter()
            .map(|t| {
                let width = self
                    .label_widths
                    .get(t)
                    .copied()
                    .unwrap_or_else(|| t.chars().count());
                (t.clone(), width)
            })
            .collect()
    }

    /// Solve terminal positions and build the layout.
    pub fn layout(&self) -> Result<Layout, ConfigError> {
        let layout = Layout::solve(
            &self.terminals,
            &self.distance_table(),
            self.scale,
            Anchor {
                terminal: &self.anchor,
                column: self.center,
            },
            &self.label_widths(),
        )?;
        Ok(layout)
    }

    /// Connection sets to draw.
    ///
    /// With no names, every set in file order. Otherwise the named sets in
    /// the order asked for.
    pub fn select_sets(&self, names: &[String]) -> Result<Vec<ConnectionSet>, ConfigError> {
        if names.is_empty() {
            return Ok(self.connection_sets.iter().map(ConnectionSet::from).collect());
        }

        names
            .iter()
            .map(|name| {
                self.connection_sets
                    .iter()
                    .find(|s| &s.name == name)
                    .map(ConnectionSet::from)
                    .ok_or_else(|| ConfigError::UnknownSet(name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PISTE_LAYOUT: &str = include_str!("../layouts/piste.yml");

    const SMALL_LAYOUT: &str = "\
terminals: [A, B, C]
anchor: B
distances:
  - [A, B, 15]
  - [B, C, 20]
connection_sets:
  - name: bus
    connections:
      - [A, C, R]
";

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::from_yaml("terminals: [Piste]\n").unwrap();
        assert_eq!(config.anchor, "Piste");
        assert_eq!(config.center, 50);
        assert_eq!(config.scale, 0.5);
        assert!(config.distances.is_empty());
        assert!(config.connection_sets.is_empty());
    }

    #[test]
    fn test_small_layout_positions() {
        let config = LayoutConfig::from_yaml(SMALL_LAYOUT).unwrap();
        let layout = config.layout().unwrap();

        let columns: Vec<usize> = layout.terminals().iter().map(|t| t.position).collect();
        assert_eq!(columns, vec![42, 50, 60]);
    }

    #[test]
    fn test_connection_forms() {
        let yaml = "\
terminals: [A, B]
connection_sets:
  - name: all
    connections:
      - [A, B]
      - [A, B, R]
      - { from: B, to: A, resistor: true }
      - { from: B, to: A }
";
        let config = LayoutConfig::from_yaml(yaml).unwrap();
        let sets = config.select_sets(&[]).unwrap();
        assert_eq!(
            sets[0].connections,
            vec![
                Connection::plain("A", "B"),
                Connection::resistor("A", "B"),
                Connection::resistor("B", "A"),
                Connection::plain("B", "A"),
            ]
        );
    }

    #[test]
    fn test_unknown_marker_rejected() {
        let yaml = "\
terminals: [A, B]
connection_sets:
  - name: bad
    connections:
      - [A, B, C]
";
        let err = LayoutConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_label_width_defaults_and_overrides() {
        let yaml = "terminals: [A_1, Piste]\nlabel_widths:\n  Piste: 7\n";
        let config = LayoutConfig::from_yaml(yaml).unwrap();
        let widths = config.label_widths();
        assert_eq!(widths["A_1"], 3);
        assert_eq!(widths["Piste"], 7);
    }

    #[test]
    fn test_label_width_for_unknown_terminal() {
        let yaml = "terminals: [A]\nlabel_widths:\n  Z: 3\n";
        let err = LayoutConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLabelTerminal(id) if id == "Z"));
    }

    #[test]
    fn test_duplicate_set_name() {
        let yaml = "\
terminals: [A, B]
connection_sets:
  - name: x
  - name: x
";
        let err = LayoutConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSet(name) if name == "x"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = LayoutConfig::from_yaml("terminals: [A]\nwidth: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_distance_surfaces_as_layout_error() {
        let yaml = "terminals: [A, B]\nanchor: A\n";
        let config = LayoutConfig::from_yaml(yaml).unwrap();
        let err = config.layout().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Layout(LayoutError::MissingDistance { .. })
        ));
    }

    #[test]
    fn test_select_sets_by_name() {
        let config = LayoutConfig::from_yaml(PISTE_LAYOUT).unwrap();

        let sets = config
            .select_sets(&["12_2b".to_string(), "10_1a".to_string()])
            .unwrap();
        let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["12_2b", "10_1a"]);

        let err = config.select_sets(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSet(name) if name == "nope"));
    }

    #[test]
    fn test_shipped_piste_layout() {
        let config = LayoutConfig::from_yaml(PISTE_LAYOUT).unwrap();
        let layout = config.layout().unwrap();

        let columns: Vec<usize> = layout.terminals().iter().map(|t| t.position).collect();
        assert_eq!(columns, vec![17, 25, 35, 50, 65, 75, 83]);

        let sets = config.select_sets(&[]).unwrap();
        assert_eq!(sets.len(), 9);
        for set in &sets {
            assert!(crate::diagram::draw_diagram(&layout, &set.connections).is_ok());
        }
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.yml");

        let err = LayoutConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layout.yml");
        std::fs::write(&path, SMALL_LAYOUT).unwrap();

        let config = LayoutConfig::load(&path).unwrap();
        assert_eq!(config.terminals, vec!["A", "B", "C"]);
        assert_eq!(config.connection_sets[0].name, "bus");
    }
}
