//! Voice catalog: quality ranking, gender detection and voice selection
//!
//! Scores are computed once per [`VoiceCatalog::refresh`]:
//! - +10 for platform-native voices
//! - +5 per premium name fragment ("neural", "enhanced", ...)
//! - -10 per low-quality engine fragment ("espeak", "compact", ...)
//! - +3 per recognized high-quality voice name for the voice's language
//! - +15 when an explicit gender keyword appears in the name
//!
//! Gender comes from explicit keywords first and from curated first names
//! second. Platform names such as "Microsoft Mark Female" carry both, and the
//! keyword wins.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use super::models::{normalize_tag, primary_subtag, Gender, GenderPreference, GenderPreferenceMap, Voice};

const LOCAL_SERVICE_BONUS: i32 = 10;
const PREMIUM_BONUS: i32 = 5;
const LOW_QUALITY_PENALTY: i32 = 10;
const KNOWN_NAME_BONUS: i32 = 3;
const GENDER_KEYWORD_BONUS: i32 = 15;

const PREMIUM_FRAGMENTS: &[&str] = &["premium", "enhanced", "neural", "natural", "wavenet", "studio"];
const LOW_QUALITY_FRAGMENTS: &[&str] = &["espeak", "compact", "festival", "pico", "mbrola"];

/// Voices known to sound good, keyed by primary language subtag
const KNOWN_GOOD_NAMES: &[(&str, &[&str])] = &[
    ("en", &["samantha", "daniel", "karen", "moira", "serena", "alex", "ava", "allison", "tom"]),
    ("fr", &["amélie", "amelie", "thomas", "audrey", "aurélie", "aurelie"]),
    ("es", &["mónica", "monica", "paulina", "jorge", "diego"]),
    ("de", &["anna", "markus", "petra", "yannick"]),
    ("it", &["alice", "luca", "federica"]),
    ("pt", &["joana", "luciana", "felipe"]),
    ("nl", &["xander", "claire", "ellen"]),
    ("ru", &["milena", "yuri"]),
    ("ja", &["kyoko", "otoya"]),
    ("zh", &["ting-ting", "tingting", "mei-jia", "li-mu"]),
    ("ko", &["yuna"]),
];

const FEMALE_NAMES: &[(&str, &[&str])] = &[
    ("en", &[
        "samantha", "karen", "moira", "tessa", "serena", "victoria", "allison", "ava", "susan",
        "zira", "kate", "fiona", "veena", "hazel", "emma", "joanna", "kendra", "kimberly",
        "salli", "amy", "olivia", "aria", "jenny", "libby", "sonia", "natasha",
    ]),
    ("fr", &[
        "amélie", "amelie", "audrey", "aurélie", "aurelie", "julie", "hortense", "céline",
        "celine", "léa", "lea", "marie", "virginie", "denise", "chantal",
    ]),
    ("es", &[
        "mónica", "monica", "paulina", "marisol", "helena", "laura", "lucia", "conchita",
        "penelope", "elvira", "dalia",
    ]),
    ("de", &["anna", "petra", "helena", "hedda", "katja", "marlene", "vicki", "amala"]),
    ("it", &["alice", "federica", "paola", "elsa", "carla", "bianca", "isabella"]),
    ("pt", &["joana", "luciana", "fernanda", "francisca", "raquel", "inês", "ines", "vitoria"]),
    ("nl", &["claire", "ellen", "fenna", "colette"]),
    ("ru", &["milena", "katya", "irina", "svetlana", "tatyana", "dariya"]),
    ("ja", &["kyoko", "o-ren", "haruka", "ayumi", "nanami", "mizuki", "sayaka"]),
    ("zh", &["ting-ting", "tingting", "mei-jia", "sin-ji", "huihui", "yaoyao", "xiaoxiao", "xiaoyi"]),
    ("ko", &["yuna", "heami", "sunhi", "seoyeon"]),
];

const MALE_NAMES: &[(&str, &[&str])] = &[
    ("en", &[
        "alex", "daniel", "fred", "tom", "david", "mark", "george", "james", "rishi", "oliver",
        "matthew", "justin", "joey", "brian", "guy", "ryan",
    ]),
    ("fr", &["thomas", "nicolas", "paul", "mathieu", "henri", "claude", "rémy", "remy"]),
    ("es", &["jorge", "diego", "juan", "pablo", "enrique", "miguel", "álvaro", "alvaro", "carlos"]),
    ("de", &["markus", "yannick", "stefan", "hans", "conrad", "klaus"]),
    ("it", &["luca", "cosimo", "giorgio", "benigno"]),
    ("pt", &["felipe", "cristiano", "ricardo", "duarte", "antónio", "antonio"]),
    ("nl", &["xander", "maarten", "ruben"]),
    ("ru", &["yuri", "maxim", "pavel", "dmitry"]),
    ("ja", &["otoya", "ichiro", "keita", "hattori", "takumi"]),
    ("zh", &["li-mu", "kangkang", "yunxi", "yunjian", "yunyang", "zhiwei"]),
    ("ko", &["injoon", "minsu"]),
];

fn names_for(
    table: &'static [(&'static str, &'static [&'static str])],
    primary: &str,
) -> &'static [&'static str] {
    table
        .iter()
        .find(|(lang, _)| *lang == primary)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// Lowercased name tokens; hyphens stay inside tokens ("ting-ting")
fn name_tokens(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|t| t.trim_matches('-').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A voice with its derived ranking data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredVoice {
    pub voice: Voice,
    pub quality_score: i32,
    pub gender: Gender,
}

/// Keyword patterns used for scoring and gender detection
struct VoiceRules {
    female_keywords: Regex,
    male_keywords: Regex,
}

impl VoiceRules {
    fn new() -> Self {
        Self {
            female_keywords: Regex::new(
                r"(?i)\b(female|woman|women|girl|femme|femenina|femenino|mujer|frau|weiblich|donna|feminina|mulher|vrouw)\b",
            )
            .expect("Invalid regex"),
            male_keywords: Regex::new(
                r"(?i)\b(male|man|men|boy|homme|masculino|masculina|hombre|mann|männlich|uomo|homem)\b",
            )
            .expect("Invalid regex"),
        }
    }

    fn keyword_gender(&self, name: &str) -> Option<Gender> {
        if self.female_keywords.is_match(name) {
            Some(Gender::Female)
        } else if self.male_keywords.is_match(name) {
            Some(Gender::Male)
        } else {
            None
        }
    }

    fn score(&self, voice: &Voice) -> ScoredVoice {
        let lowered = voice.name.to_lowercase();
        let tokens = name_tokens(&voice.name);
        let primary = primary_subtag(&voice.lang);

        let mut score = 0;
        if voice.is_local_service {
            score += LOCAL_SERVICE_BONUS;
        }
        score += PREMIUM_BONUS * PREMIUM_FRAGMENTS.iter().filter(|f| lowered.contains(*f)).count() as i32;
        score -= LOW_QUALITY_PENALTY
            * LOW_QUALITY_FRAGMENTS.iter().filter(|f| lowered.contains(*f)).count() as i32;
        score += KNOWN_NAME_BONUS
            * names_for(KNOWN_GOOD_NAMES, &primary)
                .iter()
                .filter(|n| tokens.iter().any(|t| t.as_str() == **n))
                .count() as i32;

        let gender = match self.keyword_gender(&voice.name) {
            Some(gender) => {
                score += GENDER_KEYWORD_BONUS;
                gender
            }
            None => name_gender(&tokens, &primary),
        };

        ScoredVoice {
            voice: voice.clone(),
            quality_score: score,
            gender,
        }
    }
}

fn name_gender(tokens: &[String], primary: &str) -> Gender {
    let has = |names: &[&str]| tokens.iter().any(|t| names.contains(&t.as_str()));
    if has(names_for(FEMALE_NAMES, primary)) {
        Gender::Female
    } else if has(names_for(MALE_NAMES, primary)) {
        Gender::Male
    } else {
        Gender::Unknown
    }
}

/// Indexed set of available voices
pub struct VoiceCatalog {
    rules: VoiceRules,
    voices: Vec<ScoredVoice>,
    /// Voice indices per normalized tag, best first
    by_tag: HashMap<String, Vec<usize>>,
    /// Voice indices per primary subtag, best first
    by_primary: HashMap<String, Vec<usize>>,
    preferences: GenderPreferenceMap,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceCatalog {
    pub fn new() -> Self {
        Self {
            rules: VoiceRules::new(),
            voices: Vec::new(),
            by_tag: HashMap::new(),
            by_primary: HashMap::new(),
            preferences: GenderPreferenceMap::new(),
        }
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let mut catalog = Self::new();
        catalog.refresh(voices);
        catalog
    }

    pub fn set_preferences(&mut self, preferences: GenderPreferenceMap) {
        self.preferences = preferences;
    }

    pub fn preferences(&self) -> &GenderPreferenceMap {
        &self.preferences
    }

    /// Re-score and re-index after the platform voice list changed
    pub fn refresh(&mut self, voices: Vec<Voice>) {
        self.voices = voices.iter().map(|v| self.rules.score(v)).collect();
        self.by_tag.clear();
        self.by_primary.clear();

        for (index, scored) in self.voices.iter().enumerate() {
            self.by_tag.entry(normalize_tag(&scored.voice.lang)).or_default().push(index);
            self.by_primary.entry(primary_subtag(&scored.voice.lang)).or_default().push(index);
        }

        let voices = &self.voices;
        // Stable sort keeps platform order among equal scores
        for ranking in self.by_tag.values_mut().chain(self.by_primary.values_mut()) {
            ranking.sort_by(|a, b| voices[*b].quality_score.cmp(&voices[*a].quality_score));
        }

        log::debug!(
            "Indexed {} voices across {} languages",
            self.voices.len(),
            self.by_primary.len()
        );
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[ScoredVoice] {
        &self.voices
    }

    /// Voices for a language, best first. Region-less tags ("fr") cover all
    /// regions.
    pub fn ranked(&self, language: &str) -> Vec<&ScoredVoice> {
        self.ranking(language)
            .map(|indices| indices.iter().map(|i| &self.voices[*i]).collect())
            .unwrap_or_default()
    }

    fn ranking(&self, language: &str) -> Option<&Vec<usize>> {
        let tag = normalize_tag(language);
        let primary = primary_subtag(language);
        match self.by_tag.get(&tag) {
            Some(ranking) => Some(ranking),
            None if tag == primary => self.by_primary.get(&primary),
            None => None,
        }
    }

    /// Pick the voice to narrate `language`.
    ///
    /// Returns `None` only when the catalog is empty.
    pub fn best_voice(&self, language: &str, preference: Option<GenderPreference>) -> Option<&ScoredVoice> {
        let preference = preference.unwrap_or_else(|| self.preferences.get(language));
        let primary = primary_subtag(language);

        if let Some(target) = preference.target() {
            let gendered = self
                .by_primary
                .get(&primary)
                .into_iter()
                .flatten()
                .map(|i| &self.voices[*i])
                .find(|v| v.gender == target);
            if let Some(voice) = gendered {
                return Some(voice);
            }
            log::debug!("No {:?} voice for {}, falling back to ranking", target, language);
        }

        if let Some(best) = self.ranking(language).and_then(|r| r.first()) {
            return Some(&self.voices[*best]);
        }

        if let Some(ranking) = self.by_primary.get(&primary) {
            let local = ranking.iter().map(|i| &self.voices[*i]).find(|v| v.voice.is_local_service);
            if let Some(voice) = local.or_else(|| ranking.first().map(|i| &self.voices[*i])) {
                return Some(voice);
            }
        }

        let fallback = self.voices.first();
        if let Some(voice) = fallback {
            log::info!("No voice for {}, using default voice {}", language, voice.voice.name);
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::with_voices(vec![
            Voice::new("Google US English Male", "en-US", false),
            Voice::new("Google US English Female", "en-US", false),
            Voice::new("Samantha", "en-US", true),
            Voice::new("Daniel", "en-GB", true),
            Voice::new("Amélie", "fr-CA", true),
            Voice::new("Thomas", "fr-FR", true),
            Voice::new("Google français", "fr-FR", false),
            Voice::new("eSpeak German", "de", true),
        ])
    }

    fn score_of(catalog: &VoiceCatalog, name: &str) -> ScoredVoice {
        catalog.voices().iter().find(|v| v.voice.name == name).cloned().unwrap()
    }

    #[test]
    fn test_quality_scores() {
        let catalog = catalog();
        // local + known name
        assert_eq!(score_of(&catalog, "Samantha").quality_score, 13);
        // keyword bonus only
        assert_eq!(score_of(&catalog, "Google US English Male").quality_score, 15);
        // local - espeak
        assert_eq!(score_of(&catalog, "eSpeak German").quality_score, 0);

        let premium = VoiceCatalog::with_voices(vec![Voice::new("Ava (Premium Enhanced)", "en-US", true)]);
        assert_eq!(premium.voices()[0].quality_score, 10 + 5 + 5 + 3);
    }

    #[test]
    fn test_gender_detection() {
        let catalog = catalog();
        assert_eq!(score_of(&catalog, "Google US English Male").gender, Gender::Male);
        assert_eq!(score_of(&catalog, "Google US English Female").gender, Gender::Female);
        assert_eq!(score_of(&catalog, "Samantha").gender, Gender::Female);
        assert_eq!(score_of(&catalog, "Thomas").gender, Gender::Male);
        assert_eq!(score_of(&catalog, "Google français").gender, Gender::Unknown);
    }

    #[test]
    fn test_keyword_beats_name_list() {
        // "Mark" is a male name, but the keyword says female
        let catalog = VoiceCatalog::with_voices(vec![Voice::new("Microsoft Mark Female", "en-US", false)]);
        assert_eq!(catalog.voices()[0].gender, Gender::Female);
    }

    #[test]
    fn test_female_preference_never_returns_male_keyword_voice() {
        let catalog = catalog();
        for tag in ["en-US", "en", "en_us", "EN-US"] {
            let voice = catalog.best_voice(tag, Some(GenderPreference::Female)).unwrap();
            assert_ne!(voice.voice.name, "Google US English Male");
            assert_eq!(voice.gender, Gender::Female);
        }
    }

    #[test]
    fn test_male_preference_picks_best_male() {
        let catalog = catalog();
        let voice = catalog.best_voice("en-US", Some(GenderPreference::Male)).unwrap();
        // Daniel (en-GB, local, known name) has 10 + 3 = 13; Google male has 15
        assert_eq!(voice.voice.name, "Google US English Male");
    }

    #[test]
    fn test_auto_uses_language_ranking() {
        let catalog = catalog();
        let voice = catalog.best_voice("fr-FR", Some(GenderPreference::Auto)).unwrap();
        assert_eq!(voice.voice.name, "Thomas");
    }

    #[test]
    fn test_preference_map_applies_without_explicit_preference() {
        let mut catalog = catalog();
        let mut prefs = GenderPreferenceMap::new();
        prefs.set("fr", GenderPreference::Female);
        catalog.set_preferences(prefs);

        let voice = catalog.best_voice("fr-FR", None).unwrap();
        assert_eq!(voice.voice.name, "Amélie");

        // Explicit preference overrides the map
        let voice = catalog.best_voice("fr-FR", Some(GenderPreference::Male)).unwrap();
        assert_eq!(voice.voice.name, "Thomas");
    }

    #[test]
    fn test_missing_gender_falls_back_to_ranking() {
        let catalog = catalog();
        let voice = catalog.best_voice("de-DE", Some(GenderPreference::Female)).unwrap();
        assert_eq!(voice.voice.name, "eSpeak German");
    }

    #[test]
    fn test_region_fallback_prefers_local() {
        let catalog = VoiceCatalog::with_voices(vec![
            Voice::new("Google español Premium Neural Female", "es-ES", false),
            Voice::new("Paulina", "es-MX", true),
        ]);
        assert!(catalog.voices()[0].quality_score > catalog.voices()[1].quality_score);
        let voice = catalog.best_voice("es-AR", None).unwrap();
        assert_eq!(voice.voice.name, "Paulina");
    }

    #[test]
    fn test_unknown_language_gets_first_voice() {
        let catalog = catalog();
        let voice = catalog.best_voice("tlh-KL", None).unwrap();
        assert_eq!(voice.voice.name, "Google US English Male");
    }

    #[test]
    fn test_selection_is_total() {
        let catalog = catalog();
        let tags = ["en-US", "en-GB", "en", "fr", "fr-BE", "de-AT", "ja-JP", "", "x", "zz-ZZ"];
        let prefs = [
            None,
            Some(GenderPreference::Male),
            Some(GenderPreference::Female),
            Some(GenderPreference::Auto),
        ];
        for tag in tags {
            for pref in prefs {
                assert!(catalog.best_voice(tag, pref).is_some(), "no voice for {:?}/{:?}", tag, pref);
            }
        }
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = VoiceCatalog::new();
        assert!(catalog.best_voice("en-US", None).is_none());
        assert!(catalog.ranked("en").is_empty());
    }

    #[test]
    fn test_ranked_listing() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.ranked("fr").iter().map(|v| v.voice.name.as_str()).collect();
        assert_eq!(names, vec!["Amélie", "Thomas", "Google français"]);

        let names: Vec<&str> = catalog.ranked("fr-FR").iter().map(|v| v.voice.name.as_str()).collect();
        assert_eq!(names, vec!["Thomas", "Google français"]);
    }
}
