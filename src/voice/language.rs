//! Heuristic language detection for card text
//!
//! Each language scores one point per character matching its
//! diacritic/script class and one point per common function word. The best
//! score wins; a tie for first place or a text with no signal at all yields
//! the fallback language.

use regex::Regex;

pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en-US";

struct LanguageProfile {
    tag: &'static str,
    chars: Option<Regex>,
    words: &'static [&'static str],
    /// Scripts without word spacing match function words as substrings
    substring_words: bool,
}

impl LanguageProfile {
    fn spaced(tag: &'static str, chars: Option<&str>, words: &'static [&'static str]) -> Self {
        Self {
            tag,
            chars: chars.map(|pattern| Regex::new(pattern).expect("Invalid regex")),
            words,
            substring_words: false,
        }
    }

    fn unspaced(tag: &'static str, chars: &str, words: &'static [&'static str]) -> Self {
        Self {
            tag,
            chars: Some(Regex::new(chars).expect("Invalid regex")),
            words,
            substring_words: true,
        }
    }

    fn score(&self, text: &str, tokens: &[&str]) -> usize {
        let char_hits = self.chars.as_ref().map_or(0, |re| re.find_iter(text).count());
        let word_hits = if self.substring_words {
            self.words.iter().map(|w| text.matches(w).count()).sum()
        } else {
            tokens.iter().filter(|t| self.words.contains(t)).count()
        };
        char_hits + word_hits
    }
}

/// Guesses the language of card text that carries no explicit tag
pub struct LanguageDetector {
    profiles: Vec<LanguageProfile>,
    fallback: String,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_LANGUAGE)
    }
}

impl LanguageDetector {
    pub fn new(fallback: impl Into<String>) -> Self {
        let profiles = vec![
            LanguageProfile::spaced(
                "en-US",
                None,
                &[
                    "the", "a", "an", "and", "is", "are", "was", "i", "you", "he", "she", "it", "we",
                    "they", "of", "to", "in", "that", "this", "with", "for", "not", "be", "have",
                    "what", "where", "does", "do",
                ],
            ),
            LanguageProfile::spaced(
                "fr-FR",
                Some(r"[àâæçéèêëîïôœùûüÿÀÂÆÇÉÈÊËÎÏÔŒÙÛÜŸ]"),
                &[
                    "le", "la", "les", "un", "une", "des", "et", "est", "je", "tu", "il", "elle", "nous",
                    "vous", "ils", "ce", "que", "qui", "pas", "pour", "dans", "avec", "sur", "du", "au",
                    "ne", "où", "très", "mais", "ou",
                ],
            ),
            LanguageProfile::spaced(
                "es-ES",
                Some(r"[áéíóúñü¿¡ÁÉÍÓÚÑÜ]"),
                &[
                    "el", "la", "los", "las", "un", "una", "y", "es", "que", "de", "en", "no", "por",
                    "para", "con", "está", "yo", "tú", "muy", "pero", "lo", "se", "sé", "dónde", "qué",
                ],
            ),
            LanguageProfile::spaced(
                "de-DE",
                Some(r"[äöüßÄÖÜ]"),
                &[
                    "der", "die", "das", "und", "ist", "ich", "nicht", "ein", "eine", "zu", "mit", "auf",
                    "für", "sie", "es", "wir", "ihr", "sind", "auch", "den", "dem",
                ],
            ),
            LanguageProfile::spaced(
                "it-IT",
                Some(r"[àèéìíîòóùÀÈÉÌÒÙ]"),
                &[
                    "il", "lo", "la", "gli", "le", "un", "una", "e", "è", "che", "di", "non", "per",
                    "con", "sono", "io", "tu", "lui", "lei", "questo", "ma", "molto", "ho",
                ],
            ),
            LanguageProfile::spaced(
                "pt-PT",
                Some(r"[ãõáâàçéêíóôúÃÕÁÂÀÇÉÊÍÓÔÚ]"),
                &[
                    "o", "a", "os", "as", "um", "uma", "e", "é", "que", "de", "não", "em", "para",
                    "com", "por", "eu", "você", "muito", "está", "isso", "mas",
                ],
            ),
            LanguageProfile::spaced(
                "nl-NL",
                None,
                &[
                    "de", "het", "een", "en", "is", "ik", "je", "niet", "van", "dat", "met", "voor",
                    "zijn", "op", "wij", "maar", "waar",
                ],
            ),
            LanguageProfile::spaced(
                "ru-RU",
                Some(r"\p{Cyrillic}"),
                &["и", "в", "не", "на", "я", "что", "он", "она", "это", "где"],
            ),
            LanguageProfile::unspaced(
                "ja-JP",
                r"[\p{Hiragana}\p{Katakana}]",
                &["は", "が", "を", "に", "の", "です", "ます"],
            ),
            LanguageProfile::unspaced("zh-CN", r"\p{Han}", &["的", "是", "了", "不", "我", "你", "在", "有"]),
            LanguageProfile::unspaced("ko-KR", r"\p{Hangul}", &["은", "는", "이", "가", "을", "를"]),
        ];

        Self {
            profiles,
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn supported_languages(&self) -> Vec<&'static str> {
        self.profiles.iter().map(|p| p.tag).collect()
    }

    /// Score of every supported language for `text`
    pub fn scores(&self, text: &str) -> Vec<(&'static str, usize)> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| !t.is_empty())
            .collect();

        self.profiles
            .iter()
            .map(|profile| (profile.tag, profile.score(&lowered, &tokens)))
            .collect()
    }

    pub fn detect(&self, text: &str) -> String {
        let scores = self.scores(text);
        let best = scores.iter().map(|(_, score)| *score).max().unwrap_or(0);
        let leaders: Vec<&str> = scores
            .iter()
            .filter(|(_, score)| *score == best)
            .map(|(tag, _)| *tag)
            .collect();

        if best == 0 || leaders.len() != 1 {
            log::debug!("Language of {:?} is ambiguous, using {}", text, self.fallback);
            return self.fallback.clone();
        }

        leaders[0].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> String {
        LanguageDetector::default().detect(text)
    }

    #[test]
    fn test_detect_latin_languages() {
        assert_eq!(detect("Je ne sais pas où est la bibliothèque"), "fr-FR");
        assert_eq!(detect("¿Dónde está la biblioteca? No lo sé."), "es-ES");
        assert_eq!(detect("Ich weiß nicht, ob das Mädchen zu Hause ist"), "de-DE");
        assert_eq!(detect("Questo è il mio libro e non lo presto"), "it-IT");
        assert_eq!(detect("Eu não sei onde está o livro"), "pt-PT");
        assert_eq!(detect("Ik weet niet waar het boek is"), "nl-NL");
        assert_eq!(detect("Where is the library and what time does it open"), "en-US");
    }

    #[test]
    fn test_detect_other_scripts() {
        assert_eq!(detect("Я не знаю, где библиотека"), "ru-RU");
        assert_eq!(detect("これは本です"), "ja-JP");
        assert_eq!(detect("我不知道图书馆在哪里"), "zh-CN");
        assert_eq!(detect("저는 학생입니다"), "ko-KR");
    }

    #[test]
    fn test_ambiguous_text_uses_fallback() {
        let detector = LanguageDetector::new("de-DE");
        // "la" is a function word in French, Spanish and Italian
        assert_eq!(detector.detect("la"), "de-DE");
        assert_eq!(detector.detect("12345"), "de-DE");
        assert_eq!(detector.detect("   "), "de-DE");
        assert_eq!(detector.detect(""), "de-DE");
    }

    #[test]
    fn test_scores_cover_all_languages() {
        let detector = LanguageDetector::default();
        let scores = detector.scores("the cat");
        assert_eq!(scores.len(), detector.supported_languages().len());
        assert!(scores.contains(&("en-US", 1)));
    }
}
