/*!
 * Language code utilities.
 *
 * Thin helpers over the isolang crate: the pipeline only needs to check
 * that configured codes are real and to render a human-readable name into
 * the oracle instructions.
 */

use isolang::Language;

use crate::errors::ConfigError;

/// Look up a language by ISO 639-1 ("en") or 639-3 ("eng") code.
fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    }
}

/// Validate a configured language code.
pub fn validate_language_code(code: &str) -> Result<(), ConfigError> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| ConfigError::UnknownLanguage(code.to_string()))
}

/// English display name for a language code, falling back to the code
/// itself when it is not recognized.
pub fn language_name(code: &str) -> String {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}
