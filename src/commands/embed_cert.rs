//! Embed-cert command - writes a C source file holding the CA certificate.

use crate::error_fmt::AppError;
use crate::firmware::{CertStyle, cert};

use super::expand_path;

pub fn embed_cert(input: &str, output: &str, var: &str, style: CertStyle) -> Result<(), AppError> {
    let input_path = expand_path(input);
    let output_path = expand_path(output);
    cert::embed_cert(&input_path, &output_path, var, style)?;
    println!("Certificate embedded in {} successfully.", output);
    Ok(())
}
