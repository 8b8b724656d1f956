//! Post-build OTA image packaging.
//!
//! After a firmware build, the application image is copied into the OTA
//! output directory under a time-sortable name, and `esptool.py merge_bin`
//! combines bootloader, partition table and application into one image that
//! can be flashed at offset 0.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

pub const BOOTLOADER_OFFSET: &str = "0x1000";
pub const PARTITION_TABLE_OFFSET: &str = "0x8000";
pub const APP_OFFSET: &str = "0x10000";

pub const DEFAULT_CHIP: &str = "esp32";
pub const DEFAULT_ESPTOOL: &str = "esptool.py";
pub const OTA_DIR: &str = "OTAbuilds";

#[derive(Debug, Error)]
pub enum OtaError {
    #[error("required binaries not found: {}", display_paths(.0))]
    MissingInputs(Vec<PathBuf>),

    #[error("failed to create {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to execute {program}: {source}")]
    Spawn { program: String, source: std::io::Error },

    #[error("{program} failed: {stderr}")]
    CommandFailed { program: String, stderr: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input and output locations for one build environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtaPaths {
    pub app_bin: PathBuf,
    pub bootloader_bin: PathBuf,
    pub partition_bin: PathBuf,
    pub out_dir: PathBuf,
}

impl OtaPaths {
    /// Standard PlatformIO layout under `project_dir` for build env `env`.
    pub fn for_project(project_dir: &Path, env: &str) -> Self {
        OtaPaths {
            app_bin: project_dir.join(".pio").join("build").join(env).join("firmware.bin"),
            bootloader_bin: project_dir.join("bootloader").join("bootloader.bin"),
            partition_bin: project_dir.join("partition_table").join("partition-table.bin"),
            out_dir: project_dir.join(OTA_DIR),
        }
    }

    /// Inputs that do not exist on disk.
    pub fn missing_inputs(&self) -> Vec<PathBuf> {
        [&self.app_bin, &self.bootloader_bin, &self.partition_bin]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect()
    }

    /// Output file names for a given stamp: (OTA image, merged image).
    pub fn outputs(&self, stamp: &str) -> (PathBuf, PathBuf) {
        (
            self.out_dir.join(format!("firmware_{}.bin", stamp)),
            self.out_dir.join(format!("merged_firmware_{}.bin", stamp)),
        )
    }
}

/// How to invoke esptool.
#[derive(Debug, Clone)]
pub struct Esptool {
    pub program: String,
    pub chip: String,
}

impl Default for Esptool {
    fn default() -> Self {
        Esptool {
            program: DEFAULT_ESPTOOL.to_string(),
            chip: DEFAULT_CHIP.to_string(),
        }
    }
}

impl Esptool {
    /// Build the `merge_bin` invocation writing to `merged`.
    pub fn merge_command(&self, paths: &OtaPaths, merged: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--chip", self.chip.as_str(), "merge_bin", "-o"])
            .arg(merged)
            .arg(BOOTLOADER_OFFSET)
            .arg(&paths.bootloader_bin)
            .arg(PARTITION_TABLE_OFFSET)
            .arg(&paths.partition_bin)
            .arg(APP_OFFSET)
            .arg(&paths.app_bin);
        cmd
    }
}

/// Files written by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtaReport {
    pub ota_bin: PathBuf,
    pub merged_bin: PathBuf,
}

/// Time-sortable stamp for output file names.
pub fn new_stamp() -> String {
    ulid::Ulid::new().to_string()
}

/// Copy the OTA image and produce the merged image.
///
/// All inputs are checked first; nothing is written if any is missing.
pub fn package(paths: &OtaPaths, esptool: &Esptool, stamp: &str) -> Result<OtaReport, OtaError> {
    let missing = paths.missing_inputs();
    if !missing.is_empty() {
        return Err(OtaError::MissingInputs(missing));
    }

    std::fs::create_dir_all(&paths.out_dir).map_err(|source| OtaError::CreateDir {
        path: paths.out_dir.clone(),
        source,
    })?;

    let (ota_bin, merged_bin) = paths.outputs(stamp);

    std::fs::copy(&paths.app_bin, &ota_bin).map_err(|source| OtaError::Copy {
        from: paths.app_bin.clone(),
        to: ota_bin.clone(),
        source,
    })?;
    info!(path = %ota_bin.display(), "copied OTA firmware");

    let mut cmd = esptool.merge_command(paths, &merged_bin);
    debug!(command = ?cmd, "running esptool");
    let output = cmd.output().map_err(|source| OtaError::Spawn {
        program: esptool.program.clone(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(OtaError::CommandFailed {
            program: esptool.program.clone(),
            stderr,
        });
    }
    info!(path = %merged_bin.display(), "merged firmware created");

    Ok(OtaReport { ota_bin, merged_bin })
}
