//! Flags command - prints extra C++ flags for the build frameworks.

use tracing::info;

use crate::firmware::extra_cxx_flags;

pub fn flags(frameworks: &[String]) {
    let flags = extra_cxx_flags(frameworks);
    if !flags.is_empty() {
        info!(count = flags.len(), "applying extra CXXFLAGS for ESP-IDF framework");
    }
    println!("{}", flags.join(" "));
}
