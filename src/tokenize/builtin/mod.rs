//! Built-in language definitions
//!
//! One tokenizer per mode of the built-in theme. The "none" mode has no
//! tokenizer and is emitted as plain text.

mod c_family;
mod python;
mod shell;
mod toit;

use super::language::LanguageDefinition;

/// Get all built-in language definitions
pub fn all_languages() -> Vec<LanguageDefinition> {
    vec![
        python::python_language(),
        shell::shell_language(),
        c_family::go_language(),
        c_family::java_language(),
        c_family::dart_language(),
        toit::toit_language(),
    ]
}
