// Bengali block, U+0980..U+09FF.
const BENGALI: std::ops::RangeInclusive<char> = '\u{0980}'..='\u{09FF}';

/// The danda closes a sentence the way `.` does.
pub const DANDA: char = '\u{0964}';

pub fn is_bengali_char(ch: char) -> bool {
    BENGALI.contains(&ch)
}

/// Tokens already written in Bengali script bypass the cascade.
pub fn contains_bengali(token: &str) -> bool {
    token.chars().any(is_bengali_char)
}
