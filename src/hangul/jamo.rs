//! Hangul Compatibility Jamo tables and syllable arithmetic.
//!
//! Everything here works on the compatibility block (U+3131..U+318E), which is
//! what a two-set keyboard emits, and on precomposed syllables (U+AC00..U+D7A3).

pub const SYLLABLE_FIRST: u32 = 0xAC00;
pub const SYLLABLE_LAST: u32 = 0xD7A3;

const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

/// Leading consonants in syllable-index order.
pub const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ',
    'ㅍ', 'ㅎ',
];

/// Vowels in syllable-index order.
pub const MEDIALS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ', 'ㅟ',
    'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Trailing consonants; syllable final index is position + 1 (0 means none).
pub const FINALS: [char; 27] = [
    'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ', 'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ', 'ㅁ', 'ㅂ',
    'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// (first, second, compound) vowel combinations.
const COMPOUND_VOWELS: [(char, char, char); 7] = [
    ('ㅗ', 'ㅏ', 'ㅘ'),
    ('ㅗ', 'ㅐ', 'ㅙ'),
    ('ㅗ', 'ㅣ', 'ㅚ'),
    ('ㅜ', 'ㅓ', 'ㅝ'),
    ('ㅜ', 'ㅔ', 'ㅞ'),
    ('ㅜ', 'ㅣ', 'ㅟ'),
    ('ㅡ', 'ㅣ', 'ㅢ'),
];

/// (first, second, cluster) trailing-consonant combinations.
const FINAL_CLUSTERS: [(char, char, char); 11] = [
    ('ㄱ', 'ㅅ', 'ㄳ'),
    ('ㄴ', 'ㅈ', 'ㄵ'),
    ('ㄴ', 'ㅎ', 'ㄶ'),
    ('ㄹ', 'ㄱ', 'ㄺ'),
    ('ㄹ', 'ㅁ', 'ㄻ'),
    ('ㄹ', 'ㅂ', 'ㄼ'),
    ('ㄹ', 'ㅅ', 'ㄽ'),
    ('ㄹ', 'ㅌ', 'ㄾ'),
    ('ㄹ', 'ㅍ', 'ㄿ'),
    ('ㄹ', 'ㅎ', 'ㅀ'),
    ('ㅂ', 'ㅅ', 'ㅄ'),
];

/// Plain consonant → tense (double) counterpart, as produced by Shift on a
/// two-set keyboard. Also covers the two shifted vowels.
const TENSE_PAIRS: [(char, char); 7] = [
    ('ㅂ', 'ㅃ'),
    ('ㅈ', 'ㅉ'),
    ('ㄷ', 'ㄸ'),
    ('ㄱ', 'ㄲ'),
    ('ㅅ', 'ㅆ'),
    ('ㅐ', 'ㅒ'),
    ('ㅔ', 'ㅖ'),
];

pub fn initial_index(ch: char) -> Option<u32> {
    INITIALS.iter().position(|&c| c == ch).map(|i| i as u32)
}

pub fn medial_index(ch: char) -> Option<u32> {
    MEDIALS.iter().position(|&c| c == ch).map(|i| i as u32)
}

/// 1-based index into the syllable final slot.
pub fn final_index(ch: char) -> Option<u32> {
    FINALS.iter().position(|&c| c == ch).map(|i| i as u32 + 1)
}

pub fn is_consonant(ch: char) -> bool {
    ('\u{3131}'..='\u{314E}').contains(&ch)
}

pub fn is_vowel(ch: char) -> bool {
    ('\u{314F}'..='\u{3163}').contains(&ch)
}

pub fn is_jamo(ch: char) -> bool {
    is_consonant(ch) || is_vowel(ch)
}

pub fn is_syllable(ch: char) -> bool {
    (SYLLABLE_FIRST..=SYLLABLE_LAST).contains(&(ch as u32))
}

/// True if the text contains any Hangul (jamo or syllable).
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(|ch| is_jamo(ch) || is_syllable(ch))
}

pub fn combine_vowels(first: char, second: char) -> Option<char> {
    COMPOUND_VOWELS
        .iter()
        .find(|(a, b, _)| *a == first && *b == second)
        .map(|(_, _, c)| *c)
}

pub fn split_vowel(ch: char) -> Option<(char, char)> {
    COMPOUND_VOWELS
        .iter()
        .find(|(_, _, c)| *c == ch)
        .map(|(a, b, _)| (*a, *b))
}

pub fn combine_finals(first: char, second: char) -> Option<char> {
    FINAL_CLUSTERS
        .iter()
        .find(|(a, b, _)| *a == first && *b == second)
        .map(|(_, _, c)| *c)
}

pub fn split_final(ch: char) -> Option<(char, char)> {
    FINAL_CLUSTERS
        .iter()
        .find(|(_, _, c)| *c == ch)
        .map(|(a, b, _)| (*a, *b))
}

/// Tense counterpart for keys that have one; `None` for every other jamo.
pub fn tense_variant(ch: char) -> Option<char> {
    TENSE_PAIRS
        .iter()
        .find(|(plain, _)| *plain == ch)
        .map(|(_, tense)| *tense)
}

pub fn compose_syllable(initial: char, medial: char, final_: Option<char>) -> Option<char> {
    let i = initial_index(initial)?;
    let m = medial_index(medial)?;
    let f = match final_ {
        Some(ch) => final_index(ch)?,
        None => 0,
    };
    char::from_u32(SYLLABLE_FIRST + (i * MEDIAL_COUNT + m) * FINAL_COUNT + f)
}

pub fn decompose_syllable(ch: char) -> Option<(char, char, Option<char>)> {
    if !is_syllable(ch) {
        return None;
    }
    let offset = ch as u32 - SYLLABLE_FIRST;
    let i = offset / (MEDIAL_COUNT * FINAL_COUNT);
    let m = (offset % (MEDIAL_COUNT * FINAL_COUNT)) / FINAL_COUNT;
    let f = offset % FINAL_COUNT;
    let final_ = if f == 0 {
        None
    } else {
        Some(FINALS[(f - 1) as usize])
    };
    Some((INITIALS[i as usize], MEDIALS[m as usize], final_))
}
