use crate::hangul::jamo;

/// One key of the two-set Korean layout: the Latin key it sits on, the jamo it
/// types, and the jamo it types with Shift (when that differs).
#[derive(Clone, Debug)]
pub struct PhysicalKey {
    pub latin: char,
    pub base: char,
    pub shifted: Option<char>,
}

impl PhysicalKey {
    const fn new(latin: char, base: char) -> Self {
        Self {
            latin,
            base,
            shifted: None,
        }
    }

    const fn with_shift(latin: char, base: char, shifted: char) -> Self {
        Self {
            latin,
            base,
            shifted: Some(shifted),
        }
    }

    /// The jamo this key produces for the given shift state.
    pub fn output(&self, shift: bool) -> char {
        if shift {
            self.shifted.unwrap_or(self.base)
        } else {
            self.base
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeyboardModel {
    pub rows: Vec<Vec<PhysicalKey>>,
}

impl KeyboardModel {
    /// Standard dubeolsik: consonants on the left hand, vowels on the right.
    pub fn dubeolsik() -> Self {
        let row = |keys: &[(char, char)]| -> Vec<PhysicalKey> {
            keys.iter()
                .map(|&(latin, base)| match jamo::tense_variant(base) {
                    Some(tense) => PhysicalKey::with_shift(latin, base, tense),
                    None => PhysicalKey::new(latin, base),
                })
                .collect()
        };
        Self {
            rows: vec![
                row(&[
                    ('q', 'ㅂ'),
                    ('w', 'ㅈ'),
                    ('e', 'ㄷ'),
                    ('r', 'ㄱ'),
                    ('t', 'ㅅ'),
                    ('y', 'ㅛ'),
                    ('u', 'ㅕ'),
                    ('i', 'ㅑ'),
                    ('o', 'ㅐ'),
                    ('p', 'ㅔ'),
                ]),
                row(&[
                    ('a', 'ㅁ'),
                    ('s', 'ㄴ'),
                    ('d', 'ㅇ'),
                    ('f', 'ㄹ'),
                    ('g', 'ㅎ'),
                    ('h', 'ㅗ'),
                    ('j', 'ㅓ'),
                    ('k', 'ㅏ'),
                    ('l', 'ㅣ'),
                ]),
                row(&[
                    ('z', 'ㅋ'),
                    ('x', 'ㅌ'),
                    ('c', 'ㅊ'),
                    ('v', 'ㅍ'),
                    ('b', 'ㅠ'),
                    ('n', 'ㅜ'),
                    ('m', 'ㅡ'),
                ]),
            ],
        }
    }

    /// Translate a Latin key press into a jamo. Uppercase letters act as
    /// Shift, which only changes keys that have a tense form.
    pub fn jamo_for_latin(&self, ch: char) -> Option<char> {
        let shift = ch.is_ascii_uppercase();
        let lower = ch.to_ascii_lowercase();
        self.keys()
            .find(|key| key.latin == lower)
            .map(|key| key.output(shift))
    }

    /// The physical key that types `ch`, shifted or not.
    pub fn physical_key_for(&self, ch: char) -> Option<&PhysicalKey> {
        self.keys()
            .find(|key| key.base == ch || key.shifted == Some(ch))
    }

    fn keys(&self) -> impl Iterator<Item = &PhysicalKey> {
        self.rows.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dubeolsik_rows() {
        let model = KeyboardModel::dubeolsik();
        assert_eq!(model.rows.len(), 3);
        assert_eq!(model.rows[0].len(), 10);
        assert_eq!(model.rows[1].len(), 9);
        assert_eq!(model.rows[2].len(), 7);
    }

    #[test]
    fn test_every_basic_jamo_is_reachable() {
        let model = KeyboardModel::dubeolsik();
        for ch in "ㄱㄲㄴㄷㄸㄹㅁㅂㅃㅅㅆㅇㅈㅉㅊㅋㅌㅍㅎㅏㅐㅑㅒㅓㅔㅕㅖㅗㅛㅜㅠㅡㅣ".chars() {
            assert!(
                model.physical_key_for(ch).is_some(),
                "dubeolsik missing jamo: {ch}"
            );
        }
    }

    #[test]
    fn test_shift_only_affects_tense_keys() {
        let model = KeyboardModel::dubeolsik();
        assert_eq!(model.jamo_for_latin('r'), Some('ㄱ'));
        assert_eq!(model.jamo_for_latin('R'), Some('ㄲ'));
        assert_eq!(model.jamo_for_latin('O'), Some('ㅒ'));
        assert_eq!(model.jamo_for_latin('A'), Some('ㅁ'));
        assert_eq!(model.jamo_for_latin('k'), Some('ㅏ'));
        assert_eq!(model.jamo_for_latin('1'), None);
    }

    #[test]
    fn test_physical_key_for_tense_jamo() {
        let model = KeyboardModel::dubeolsik();
        let key = model.physical_key_for('ㅆ').unwrap();
        assert_eq!(key.latin, 't');
        assert_eq!(key.output(false), 'ㅅ');
        assert_eq!(key.output(true), 'ㅆ');
    }
}
