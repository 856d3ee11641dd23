use super::script::DANDA;

/// Punctuation that stands as its own token.
pub const PUNCTUATION: [char; 3] = [',', '!', '?'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Punct(char),
}

pub fn is_sentence_end(ch: char) -> bool {
    ch == '.' || ch == DANDA
}

/// Non-empty, trimmed sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(is_sentence_end)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

pub fn ends_with_terminator(text: &str) -> bool {
    text.trim_end().chars().next_back().is_some_and(is_sentence_end)
}

/// Whitespace-separated words with leading and trailing `, ! ?` split off.
pub fn tokenize(sentence: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for raw in sentence.split_whitespace() {
        let core = raw.trim_matches(&PUNCTUATION[..]);
        if core.is_empty() {
            tokens.extend(raw.chars().map(Token::Punct));
            continue;
        }
        let start = raw.len() - raw.trim_start_matches(&PUNCTUATION[..]).len();
        let end = start + core.len();
        tokens.extend(raw[..start].chars().map(Token::Punct));
        tokens.push(Token::Word(core));
        tokens.extend(raw[end..].chars().map(Token::Punct));
    }
    tokens
}

/// Joins with single spaces, with no space before punctuation.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    for token in tokens {
        let token = token.as_ref();
        let is_punct = token.chars().count() == 1 && token.starts_with(&PUNCTUATION[..]);
        if !out.is_empty() && !is_punct {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}
