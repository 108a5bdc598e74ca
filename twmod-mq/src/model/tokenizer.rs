//! Tweet tokenizer
//!
//! Shared by the word-weight model and the lexicon stage of the classifier so
//! both see exactly the same vocabulary.

const MENTION_MARKER: char = '@';
const HASHTAG_MARKER: char = '#';
const RETWEET_MARKER: &str = "rt";
const URL_PREFIXES: [&str; 3] = ["http://", "https://", "www."];

/// Letter substituted for markers left inside a surviving token
const MARKER_REPLACEMENT: char = 'a';

/// Split `text` into normalized tokens
///
/// Mentions, URLs and the bare retweet marker are dropped; the rest is
/// lowercased and any `#`/`@` left inside a token becomes `a`, so a hashtag
/// keeps its shape without adding marker syntax to the vocabulary.
///
/// ```
/// use twmod_mq::model::tokenize;
///
/// assert_eq!(
///     tokenize("RT @user check http://x.co #Great"),
///     vec!["check", "agreat"]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    cleaned
        .split_whitespace()
        .filter(|token| !token.starts_with(MENTION_MARKER))
        .map(str::to_lowercase)
        .filter(|token| !URL_PREFIXES.iter().any(|prefix| token.starts_with(*prefix)))
        .filter(|token| token.as_str() != RETWEET_MARKER)
        .filter(|token| !token.chars().all(|c| c == HASHTAG_MARKER))
        .map(|token| {
            token
                .chars()
                .map(|c| {
                    if c == HASHTAG_MARKER || c == MENTION_MARKER {
                        MARKER_REPLACEMENT
                    } else {
                        c
                    }
                })
                .collect()
        })
        .collect()
}

/// Tokens rejoined with single spaces, as fed to the lexicon scorer
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}
