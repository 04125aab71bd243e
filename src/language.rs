//! Statistical language detection for article titles.
//!
//! The scorer only needs a language code for a short piece of text, so the
//! detector sits behind a small trait and tests can substitute a fixed
//! answer.

use crate::error::DetectError;
use whatlang::Lang;

/// Detects the dominant language of a short text.
///
/// [`DetectError::NoFeatures`] means the text had nothing to detect from
/// and the caller falls back to English. [`DetectError::Internal`] is for
/// detectors that can fault on their own (remote services, loaded models);
/// the scorer turns it into a zero score. [`WhatlangDetector`] never
/// returns it: a low-confidence guess is still a guess.
pub trait LanguageDetector {
    /// Return an ISO 639-1 code where one exists (`"en"`, `"pl"`), or the
    /// detector's native code otherwise.
    fn detect(&self, text: &str) -> Result<String, DetectError>;
}

/// Trigram-based detection backed by `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String, DetectError> {
        if !text.chars().any(char::is_alphabetic) {
            return Err(DetectError::NoFeatures);
        }
        let info = whatlang::detect(text).ok_or(DetectError::NoFeatures)?;
        let code = match info.lang() {
            Lang::Eng => "en",
            Lang::Pol => "pl",
            Lang::Deu => "de",
            Lang::Fra => "fr",
            Lang::Spa => "es",
            Lang::Ukr => "uk",
            Lang::Rus => "ru",
            other => other.code(),
        };
        Ok(code.to_string())
    }
}
