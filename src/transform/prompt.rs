//! System prompts and prompt builders for transformers.
//!
//! Each operation has a system message defining the model's role and a
//! user prompt template wrapping the segment text.

use std::fmt::Write;

use super::Operation;

/// System prompt for transcription and correction.
pub const TRANSCRIBE_SYSTEM_PROMPT: &str = "You are an expert in transcription and text correction. \
Your job is to improve spelling, punctuation, and formatting while keeping the original meaning.";

/// System prompt for translation.
pub const TRANSLATE_SYSTEM_PROMPT: &str = "You are an expert professional translator. \
Your job is to provide accurate, natural translations that keep the context and style of the original text.";

/// Supported target languages as `(code, name)` pairs.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("es", "Spanish"),
    ("en", "English"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
];

/// Returns the system prompt for an operation.
#[must_use]
pub const fn system_prompt(operation: &Operation) -> &'static str {
    match operation {
        Operation::Transcribe => TRANSCRIBE_SYSTEM_PROMPT,
        Operation::Translate { .. } => TRANSLATE_SYSTEM_PROMPT,
    }
}

/// Resolves a language code to its display name.
///
/// Unknown codes are returned as given.
///
/// # Examples
///
/// ```
/// use chunkstream::transform::prompt::language_name;
///
/// assert_eq!(language_name("fr"), "French");
/// assert_eq!(language_name("Klingon"), "Klingon");
/// ```
#[must_use]
pub fn language_name(code: &str) -> &str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map_or(code, |&(_, name)| name)
}

/// Builds the user prompt for a segment.
#[must_use]
pub fn build_prompt(text: &str, operation: &Operation) -> String {
    let mut prompt = String::with_capacity(text.len() + 200);

    match operation {
        Operation::Transcribe => {
            prompt.push_str(
                "Please transcribe the following text, improving its spelling and punctuation \
                 while keeping its original meaning. Preserve the format and structure of the text:",
            );
        }
        Operation::Translate { target_language } => {
            let _ = write!(
                prompt,
                "Translate the following text into {}. Keep the format, structure, and style \
                 of the original text. Provide a natural, fluent translation:",
                language_name(target_language)
            );
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_per_operation() {
        assert!(system_prompt(&Operation::Transcribe).contains("transcription"));
        let translate = Operation::Translate {
            target_language: "es".to_string(),
        };
        assert!(system_prompt(&translate).contains("translator"));
    }

    #[test]
    fn test_language_name_lookup() {
        assert_eq!(language_name("es"), "Spanish");
        assert_eq!(language_name("ZH"), "Chinese");
        assert_eq!(language_name("tlh"), "tlh");
        assert_eq!(SUPPORTED_LANGUAGES.len(), 14);
    }

    #[test]
    fn test_build_transcribe_prompt() {
        let prompt = build_prompt("helo wrld", &Operation::Transcribe);
        assert!(prompt.starts_with("Please transcribe"));
        assert!(prompt.ends_with("\n\nhelo wrld"));
    }

    #[test]
    fn test_build_translate_prompt_names_language() {
        let op = Operation::Translate {
            target_language: "ja".to_string(),
        };
        let prompt = build_prompt("Good morning", &op);
        assert!(prompt.contains("into Japanese"));
        assert!(prompt.ends_with("Good morning"));
    }

    #[test]
    fn test_build_translate_prompt_unknown_language() {
        let op = Operation::Translate {
            target_language: "Esperanto".to_string(),
        };
        assert!(build_prompt("Hi", &op).contains("into Esperanto"));
    }
}
