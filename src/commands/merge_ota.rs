//! Merge-ota command - packages the OTA image and the merged flash image.

use owo_colors::OwoColorize;

use crate::error_fmt::AppError;
use crate::firmware::ota::{self, Esptool, OtaPaths};

use super::expand_path;

pub fn merge_ota(project_dir: &str, env: &str, esptool: Esptool) -> Result<(), AppError> {
    let paths = OtaPaths::for_project(&expand_path(project_dir), env);
    let stamp = ota::new_stamp();

    println!("Stamp:       {}", stamp);
    println!("App binary:  {}", paths.app_bin.display());
    println!("Bootloader:  {}", paths.bootloader_bin.display());
    println!("Partition:   {}", paths.partition_bin.display());

    let report = ota::package(&paths, &esptool, &stamp)?;

    println!("{} OTA firmware copied to {}", "ok:".green(), report.ota_bin.display());
    println!("{} merged firmware created at {}", "ok:".green(), report.merged_bin.display());
    Ok(())
}
