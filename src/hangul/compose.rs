//! Two-set (dubeolsik) syllable assembly.
//!
//! `disassemble` turns text into the keystroke jamo that would have produced
//! it; `assemble` runs those keystrokes back through the input automaton.
//! For any sequence of keyboard jamo `k`,
//! `assemble(&disassemble(&assemble(k))) == assemble(k)`.

use crate::hangul::jamo;

/// The syllable block currently being built.
///
/// `initial` may temporarily hold a standalone final cluster (ㄳ) when two
/// consonants were typed without a vowel; `final_` is only set together with
/// both `initial` and `medial`.
#[derive(Default)]
struct Block {
    initial: Option<char>,
    medial: Option<char>,
    final_: Option<char>,
}

impl Block {
    fn flush(&mut self, out: &mut String) {
        match (self.initial, self.medial) {
            (Some(i), Some(m)) => match jamo::compose_syllable(i, m, self.final_) {
                Some(syllable) => out.push(syllable),
                None => {
                    out.push(i);
                    out.push(m);
                    out.extend(self.final_);
                }
            },
            (Some(i), None) => out.push(i),
            (None, Some(m)) => out.push(m),
            (None, None) => {}
        }
        *self = Block::default();
    }

    fn push_consonant(&mut self, key: char, out: &mut String) {
        match (self.initial, self.medial, self.final_) {
            (None, None, _) => self.initial = Some(key),
            (Some(initial), None, _) => match jamo::combine_finals(initial, key) {
                Some(cluster) => self.initial = Some(cluster),
                None => self.restart_with_initial(key, out),
            },
            (None, Some(_), _) => self.restart_with_initial(key, out),
            (Some(_), Some(_), None) => {
                if jamo::final_index(key).is_some() {
                    self.final_ = Some(key);
                } else {
                    self.restart_with_initial(key, out);
                }
            }
            (Some(_), Some(_), Some(final_)) => match jamo::combine_finals(final_, key) {
                Some(cluster) => self.final_ = Some(cluster),
                None => self.restart_with_initial(key, out),
            },
        }
    }

    fn push_vowel(&mut self, key: char, out: &mut String) {
        match (self.initial, self.medial, self.final_) {
            (None, None, _) => self.medial = Some(key),
            (Some(initial), None, _) => {
                if let Some((first, second)) = jamo::split_final(initial) {
                    // ㄳ + ㅏ → ㄱ사
                    out.push(first);
                    self.initial = Some(second);
                    self.medial = Some(key);
                } else if jamo::initial_index(initial).is_some() {
                    self.medial = Some(key);
                } else {
                    self.flush(out);
                    self.medial = Some(key);
                }
            }
            (None, Some(medial), _) | (Some(_), Some(medial), None) => {
                match jamo::combine_vowels(medial, key) {
                    Some(compound) => self.medial = Some(compound),
                    None => {
                        self.flush(out);
                        self.medial = Some(key);
                    }
                }
            }
            (Some(_), Some(_), Some(final_)) => {
                // The trailing consonant (or the second half of a cluster)
                // moves over to lead the next syllable.
                let (kept, carried) = match jamo::split_final(final_) {
                    Some((first, second)) => (Some(first), second),
                    None => (None, final_),
                };
                self.final_ = kept;
                self.flush(out);
                self.initial = Some(carried);
                self.medial = Some(key);
            }
        }
    }

    fn restart_with_initial(&mut self, key: char, out: &mut String) {
        self.flush(out);
        self.initial = Some(key);
    }
}

/// Compose a keystroke sequence into display text.
pub fn assemble(keys: &[char]) -> String {
    let mut out = String::with_capacity(keys.len() * 3);
    let mut block = Block::default();
    for &key in keys {
        if jamo::is_consonant(key) {
            block.push_consonant(key, &mut out);
        } else if jamo::is_vowel(key) {
            block.push_vowel(key, &mut out);
        } else {
            block.flush(&mut out);
            out.push(key);
        }
    }
    block.flush(&mut out);
    out
}

/// Split text into keystroke jamo. Tense consonants stay single keys; compound
/// vowels and final clusters are split into the keys that form them.
pub fn disassemble(text: &str) -> Vec<char> {
    let mut keys = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some((initial, medial, final_)) = jamo::decompose_syllable(ch) {
            keys.push(initial);
            push_split(medial, jamo::split_vowel, &mut keys);
            if let Some(final_) = final_ {
                push_split(final_, jamo::split_final, &mut keys);
            }
        } else if let Some((a, b)) = jamo::split_vowel(ch).or_else(|| jamo::split_final(ch)) {
            keys.push(a);
            keys.push(b);
        } else {
            keys.push(ch);
        }
    }
    keys
}

fn push_split(ch: char, split: fn(char) -> Option<(char, char)>, keys: &mut Vec<char>) {
    match split(ch) {
        Some((a, b)) => {
            keys.push(a);
            keys.push(b);
        }
        None => keys.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_consonant_vowel_makes_syllable() {
        assert_eq!(assemble(&keys("ㄱㅏ")), "가");
    }

    #[test]
    fn test_full_word() {
        assert_eq!(assemble(&keys("ㅎㅏㄴㄱㅡㄹ")), "한글");
        assert_eq!(assemble(&keys("ㅅㅏㄹㅏㅇ")), "사랑");
    }

    #[test]
    fn test_final_moves_to_next_syllable() {
        assert_eq!(assemble(&keys("ㄱㅏㄱㅏ")), "가가");
        assert_eq!(assemble(&keys("ㅇㅏㄴㅎㅏ")), "안하");
    }

    #[test]
    fn test_cluster_splits_before_vowel() {
        assert_eq!(assemble(&keys("ㅇㅣㄹㄱ")), "읽");
        assert_eq!(assemble(&keys("ㅇㅣㄹㄱㅓ")), "일거");
    }

    #[test]
    fn test_compound_vowel() {
        assert_eq!(assemble(&keys("ㄱㅗㅏ")), "과");
        assert_eq!(assemble(&keys("ㅇㅡㅣ")), "의");
        assert_eq!(assemble(&keys("ㅗㅏ")), "ㅘ");
    }

    #[test]
    fn test_vowels_without_leading_consonant() {
        assert_eq!(assemble(&keys("ㅏㅏ")), "ㅏㅏ");
        assert_eq!(assemble(&keys("ㅜㅓ")), "ㅝ");
        assert_eq!(assemble(&keys("ㅜㅓㄱㅏ")), "ㅝ가");

        // A vowel-only block never carries a final; if it did, the vowel
        // still combines and the block stays a bare vowel.
        let mut block = Block {
            initial: None,
            medial: Some('ㅗ'),
            final_: Some('ㄱ'),
        };
        let mut out = String::new();
        block.push_vowel('ㅏ', &mut out);
        assert!(out.is_empty());
        assert_eq!(block.medial, Some('ㅘ'));
        block.flush(&mut out);
        assert_eq!(out, "ㅘ");
    }

    #[test]
    fn test_tense_consonant_cannot_close_syllable() {
        assert_eq!(assemble(&keys("ㄱㅏㄸ")), "가ㄸ");
        assert_eq!(assemble(&keys("ㄱㅏㄲ")), "갂");
    }

    #[test]
    fn test_lone_consonants() {
        assert_eq!(assemble(&keys("ㄱㄱ")), "ㄱㄱ");
        assert_eq!(assemble(&keys("ㄱㅅ")), "ㄳ");
        assert_eq!(assemble(&keys("ㄱㅅㅏ")), "ㄱ사");
    }

    #[test]
    fn test_non_jamo_passes_through() {
        assert_eq!(assemble(&keys("ㄱㅏ ㄴㅏ")), "가 나");
        assert_eq!(assemble(&keys("ㄱㅏ!")), "가!");
    }

    #[test]
    fn test_disassemble_splits_compounds() {
        assert_eq!(disassemble("과"), keys("ㄱㅗㅏ"));
        assert_eq!(disassemble("읽"), keys("ㅇㅣㄹㄱ"));
        assert_eq!(disassemble("까"), keys("ㄲㅏ"));
        assert_eq!(disassemble("a 가"), keys("a ㄱㅏ"));
    }

    #[test]
    fn test_round_trip_on_composed_text() {
        for text in ["안녕하세요", "괜찮아요", "읽다", "ㄱ사", "가ㄸ", "ㅘㅣ", "값 없어"] {
            assert_eq!(assemble(&disassemble(text)), text, "round trip of {text}");
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(assemble(&[]), "");
        assert!(disassemble("").is_empty());
    }
}
