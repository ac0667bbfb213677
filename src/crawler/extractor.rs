//! TLDR sentence extraction
//!
//! This module handles scanning comment bodies for a "too long; didn't read"
//! marker and pulling out the summary sentence that follows it.

/// Tokens that open a TLDR summary (matched after lowercasing)
pub const TLDR_MARKERS: [&str; 2] = ["tldr", "tl;dr"];

/// Default ceiling on accepted candidate length, in characters
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 140;

/// Extracts the TLDR sentence from a block of text
///
/// # Extraction Rules
///
/// - The text is lowercased and split on whitespace
/// - The first token exactly equal to `tldr` or `tl;dr` starts the sentence
/// - Following tokens are appended (space separated) up to and including the
///   first token that contains a `.`, or until the text runs out
/// - A marker with nothing after it yields the marker alone
///
/// Punctuation glued to the marker (`tldr:` or `tldr,`) is not a match.
///
/// # Arguments
///
/// * `text` - The raw comment body
///
/// # Returns
///
/// * `Some(String)` - The extracted sentence, starting with the marker
/// * `None` - The text contains no marker token
///
/// # Example
///
/// ```
/// use tldr_bot::crawler::extract_tldr;
///
/// let sentence = extract_tldr("Long story. TL;DR it works. thanks");
/// assert_eq!(sentence.as_deref(), Some("tl;dr it works."));
/// ```
pub fn extract_tldr(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let mut tokens = lowered.split_whitespace();

    let marker = tokens.find(|token| TLDR_MARKERS.contains(token))?;
    let mut sentence = String::from(marker);

    for token in tokens {
        sentence.push(' ');
        sentence.push_str(token);
        if token.contains('.') {
            break;
        }
    }

    Some(sentence)
}

/// Checks a candidate sentence against the publish length ceiling
///
/// Length is counted in characters, not bytes. Over-long sentences are
/// rejected outright rather than truncated.
pub fn is_acceptable(sentence: &str, max_chars: usize) -> bool {
    sentence.chars().count() <= max_chars
}

/// Extracts a sentence and applies the length policy in one step
pub fn extract_acceptable(text: &str, max_chars: usize) -> Option<String> {
    extract_tldr(text).filter(|sentence| is_acceptable(sentence, max_chars))
}
