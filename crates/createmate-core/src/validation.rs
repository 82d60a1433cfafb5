use crate::message::UserInput;
use crate::{CreateMateError, CreateMateResult};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum number of posts per week.
pub const MAX_POST_FREQUENCY: u8 = 7;

/// Check that a [`UserInput`] can be turned into a schedule.
///
/// Area of interest and content type must be non-blank, at least one
/// non-blank keyword is required, and the frequency must be between 1 and 7.
pub fn validate_user_input(input: &UserInput) -> CreateMateResult<()> {
    if input.area_of_interest.trim().is_empty() {
        return Err(CreateMateError::Validation(
            "area_of_interest must not be empty".into(),
        ));
    }
    if input.content_type.trim().is_empty() {
        return Err(CreateMateError::Validation(
            "content_type must not be empty".into(),
        ));
    }
    if !input.keywords.iter().any(|k| !k.trim().is_empty()) {
        return Err(CreateMateError::Validation(
            "keywords must contain at least one keyword".into(),
        ));
    }
    if input.post_frequency < 1 || input.post_frequency > MAX_POST_FREQUENCY {
        return Err(CreateMateError::Validation(format!(
            "post_frequency must be between 1 and {MAX_POST_FREQUENCY}, got {}",
            input.post_frequency
        )));
    }
    Ok(())
}

#[allow(clippy::expect_used)]
fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.(?:\s+|$)").expect("sentence regex is valid"))
}

/// Format generated text for readability.
///
/// Every sentence-ending period is followed by a blank line and each
/// sentence starts with an uppercase letter. Periods inside tokens such as
/// `3.5` or `example.com` are left alone.
pub fn format_content(content: &str) -> String {
    let spaced = sentence_end().replace_all(content.trim(), ".\n\n");
    spaced
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
