//! Embed a PEM certificate into generated C source.

use std::path::{Path, PathBuf};

use minijinja::{Environment, context};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_INPUT: &str = "certs/ca_cert.pem";
pub const DEFAULT_OUTPUT: &str = "src/ca_cert.c";
pub const DEFAULT_VAR: &str = "ca_cert_pem";

/// One literal per byte; the array length comes with it.
const BYTES_TEMPLATE: &str = "#include <stddef.h>

const char {{ var }}[] =
{% for lit in literals %}{{ lit }}
{% endfor %};
const size_t {{ var }}_len = sizeof({{ var }}) - 1;
";

/// One literal per PEM line, as a plain pointer.
const LINES_TEMPLATE: &str = "#include <stdio.h>
const char* {{ var }} =
{{ literals | join(\"\\n\") }};
";

/// Layout of the generated C source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CertStyle {
    /// `const char var[]` with one literal per byte, plus `var_len`
    #[default]
    Bytes,
    /// `const char* var` with one literal per PEM line
    Lines,
}

#[derive(Debug, Error)]
pub enum CertError {
    #[error("certificate not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to read certificate {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("'{0}' is not a valid C identifier")]
    InvalidIdentifier(String),

    #[error("failed to render C source: {0}")]
    Template(#[from] minijinja::Error),
}

/// Whether `name` can be used as a C variable name.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// C string literal holding exactly one input byte.
fn byte_literal(byte: u8) -> String {
    match byte {
        b'\n' => "\"\\n\"".to_string(),
        b'"' | b'\\' => format!("\"\\x{:02x}\"", byte),
        32..=126 => format!("\"{}\"", byte as char),
        _ => format!("\"\\x{:02x}\"", byte),
    }
}

/// C string literal for one trimmed PEM line, newline included.
fn line_literal(line: &str) -> String {
    let escaped = line.trim().replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\\n\"", escaped)
}

/// Render C source embedding `pem` as variable `var`.
pub fn render_c_source(pem: &[u8], var: &str, style: CertStyle) -> Result<String, CertError> {
    if !is_c_identifier(var) {
        return Err(CertError::InvalidIdentifier(var.to_string()));
    }

    let (template, literals): (&str, Vec<String>) = match style {
        CertStyle::Bytes => (BYTES_TEMPLATE, pem.iter().map(|&b| byte_literal(b)).collect()),
        CertStyle::Lines => {
            let text = String::from_utf8_lossy(pem);
            (LINES_TEMPLATE, text.trim().lines().map(line_literal).collect())
        }
    };

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("cert.c", template)?;
    let source = env
        .get_template("cert.c")?
        .render(context! { var => var, literals => literals })?;
    Ok(source)
}

/// Read the certificate at `input` and write the C source to `output`.
pub fn embed_cert(input: &Path, output: &Path, var: &str, style: CertStyle) -> Result<(), CertError> {
    let pem = match std::fs::read(input) {
        Ok(pem) => pem,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CertError::InputNotFound(input.to_path_buf()));
        }
        Err(source) => {
            return Err(CertError::Read {
                path: input.to_path_buf(),
                source,
            });
        }
    };

    let source = render_c_source(&pem, var, style)?;
    std::fs::write(output, source).map_err(|source| CertError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        input = %input.display(),
        output = %output.display(),
        bytes = pem.len(),
        "embedded certificate"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

    #[test]
    fn test_byte_literals() {
        assert_eq!(byte_literal(b'M'), "\"M\"");
        assert_eq!(byte_literal(b' '), "\" \"");
        assert_eq!(byte_literal(b'\n'), "\"\\n\"");
        assert_eq!(byte_literal(b'"'), "\"\\x22\"");
        assert_eq!(byte_literal(b'\\'), "\"\\x5c\"");
        assert_eq!(byte_literal(b'\r'), "\"\\x0d\"");
        assert_eq!(byte_literal(0xff), "\"\\xff\"");
    }

    #[test]
    fn test_bytes_style() {
        let source = render_c_source(b"AB\n", "ca_cert_pem", CertStyle::Bytes).unwrap();
        assert_eq!(
            source,
            "#include <stddef.h>\n\
             \n\
             const char ca_cert_pem[] =\n\
             \"A\"\n\
             \"B\"\n\
             \"\\n\"\n\
             ;\n\
             const size_t ca_cert_pem_len = sizeof(ca_cert_pem) - 1;\n"
        );
    }

    #[test]
    fn test_lines_style() {
        let source = render_c_source(PEM.as_bytes(), "root_ca", CertStyle::Lines).unwrap();
        assert_eq!(
            source,
            "#include <stdio.h>\n\
             const char* root_ca =\n\
             \"-----BEGIN CERTIFICATE-----\\n\"\n\
             \"MIIB\\n\"\n\
             \"-----END CERTIFICATE-----\\n\";\n"
        );
    }

    #[test]
    fn test_lines_style_escapes_quotes() {
        let source = render_c_source(b"say \"hi\"\\\n", "v", CertStyle::Lines).unwrap();
        assert!(source.contains("\"say \\\"hi\\\"\\\\\\n\";"));
    }

    #[test]
    fn test_invalid_identifier() {
        for bad in ["", "1cert", "ca-cert", "ca cert"] {
            let err = render_c_source(b"x", bad, CertStyle::Bytes).unwrap_err();
            assert!(matches!(err, CertError::InvalidIdentifier(_)));
        }
        assert!(is_c_identifier("_ca_cert2"));
    }

    #[test]
    fn test_embed_cert_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("ca_cert.pem");
        let output = temp_dir.path().join("ca_cert.c");
        std::fs::write(&input, PEM).unwrap();

        embed_cert(&input, &output, DEFAULT_VAR, CertStyle::Bytes).unwrap();

        let source = std::fs::read_to_string(&output).unwrap();
        assert!(source.starts_with("#include <stddef.h>\n"));
        assert!(source.ends_with("const size_t ca_cert_pem_len = sizeof(ca_cert_pem) - 1;\n"));
        // One literal line per input byte
        let literal_lines = source.lines().filter(|l| l.starts_with('"')).count();
        assert_eq!(literal_lines, PEM.len());
    }

    #[test]
    fn test_embed_cert_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("missing.pem");
        let output = temp_dir.path().join("out.c");

        let err = embed_cert(&input, &output, DEFAULT_VAR, CertStyle::Bytes).unwrap_err();
        assert!(matches!(err, CertError::InputNotFound(p) if p == input));
        assert!(!output.exists());
    }
}
