use super::request::TagReplacement;
use crate::engine::{Delimiters, ReplacementText, TextInstruction};

/// Tags in slide text are written as `{{tag}}`.
pub const DELIMITERS: Delimiters = Delimiters {
    opening_tag: "{{",
    closing_tag: "}}",
};

/// Converts declared tag replacements into engine instructions, keeping order
/// and duplicates. A style is carried over only when one was given.
pub fn map_replacements(replacements: &[TagReplacement]) -> Vec<TextInstruction> {
    replacements
        .iter()
        .map(|replacement| TextInstruction {
            replace: replacement.tag.clone(),
            by: ReplacementText {
                text: replacement.text.clone(),
                style: replacement.style.clone(),
            },
        })
        .collect()
}
