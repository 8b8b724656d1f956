//! Helpers run around a firmware build.

pub mod cert;
pub mod flags;
pub mod ota;

pub use cert::{CertError, CertStyle, embed_cert, render_c_source};
pub use flags::extra_cxx_flags;
pub use ota::{Esptool, OtaError, OtaPaths, OtaReport, package};
