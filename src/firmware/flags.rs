//! Extra compiler flags for framework builds.

/// Framework name that needs the relaxed warnings.
pub const ESP_IDF: &str = "espidf";

/// Warnings ESP-IDF headers trip that must not fail the build.
pub const ESP_IDF_CXX_FLAGS: &[&str] = &[
    "-Wno-error=switch",
    "-Wno-error=unused-parameter",
    "-Wno-error=return-type",
];

/// C++ flags to append for the given build frameworks.
pub fn extra_cxx_flags<S: AsRef<str>>(frameworks: &[S]) -> &'static [&'static str] {
    if frameworks.iter().any(|f| f.as_ref().trim() == ESP_IDF) {
        ESP_IDF_CXX_FLAGS
    } else {
        &[]
    }
}
