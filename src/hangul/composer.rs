use crate::hangul::compose::{assemble, disassemble};

/// Editable answer text fed one keystroke at a time.
///
/// The text is always kept in assembled form. Every edit disassembles the
/// current text, applies the keystroke and reassembles, so the result is the
/// same as if the whole keystroke history had been typed in one go.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composer {
    text: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Append a jamo keystroke. Non-jamo characters are accepted too and end
    /// the syllable in progress.
    pub fn push(&mut self, key: char) {
        let mut keys = disassemble(&self.text);
        keys.push(key);
        self.text = assemble(&keys);
    }

    pub fn push_space(&mut self) {
        self.text.push(' ');
    }

    /// Remove the last keystroke: ending a compound vowel or final cluster
    /// removes only its second half.
    pub fn backspace(&mut self) {
        let mut keys = disassemble(&self.text);
        if keys.pop().is_some() {
            self.text = assemble(&keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(keys: &str) -> Composer {
        let mut composer = Composer::new();
        for key in keys.chars() {
            if key == ' ' {
                composer.push_space();
            } else {
                composer.push(key);
            }
        }
        composer
    }

    #[test]
    fn test_push_builds_syllables() {
        assert_eq!(typed("ㄱㅏ").text(), "가");
        assert_eq!(typed("ㅎㅏㄴㄱㅜㄱ ㅅㅏㄹㅏㅁ").text(), "한국 사람");
    }

    #[test]
    fn test_backspace_removes_one_jamo() {
        let mut composer = typed("ㄱㅏ");
        composer.backspace();
        assert_eq!(composer.text(), "ㄱ");
        composer.backspace();
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn test_backspace_splits_compound_vowel_and_cluster() {
        let mut composer = typed("ㄱㅗㅏ");
        composer.backspace();
        assert_eq!(composer.text(), "고");

        let mut composer = typed("ㅇㅣㄹㄱ");
        composer.backspace();
        assert_eq!(composer.text(), "일");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut composer = Composer::new();
        composer.backspace();
        assert!(composer.is_empty());
    }

    #[test]
    fn test_backspace_removes_trailing_space() {
        let mut composer = typed("ㄱㅏ ");
        composer.backspace();
        assert_eq!(composer.text(), "가");
        composer.push('ㄴ');
        assert_eq!(composer.text(), "간");
    }

    #[test]
    fn test_clear() {
        let mut composer = typed("ㄱㅏ");
        composer.clear();
        assert!(composer.is_empty());
    }
}
