use std::collections::HashSet;

use lindera::tokenizer::Tokenizer;
use tracing::trace;

use crate::error::{Result, WcloudError};

/// Base form reported when the dictionary has none.
pub const UNKNOWN_BASE_FORM: &str = "*";

/// Content words: noun, verb, adjective, adjectival noun, adverb.
pub const CONTENT_WORDS: [&str; 5] = ["名詞", "動詞", "形容詞", "形状詞", "副詞"];

/// Particles and auxiliary verbs.
pub const FUNCTION_WORDS: [&str; 2] = ["助詞", "助動詞"];

/// Noun, the category IPADIC gives most unknown words.
pub const NOUN: &str = "名詞";

/// Symbol, for unknown whitespace and punctuation runs.
pub const SYMBOL: &str = "記号";

// IPADIC feature layout: pos, pos detail x3, conjugation type, conjugation form, base form, ...
const POS_INDEX: usize = 0;
const BASE_FORM_INDEX: usize = 6;

// lindera's whole detail for a word outside the dictionary
const UNKNOWN_DETAIL: &str = "UNK";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Morpheme {
    pub surface: String,
    pub base_form: String,
    pub part_of_speech: String,
}

impl Morpheme {
    pub fn new(surface: &str, base_form: &str, part_of_speech: &str) -> Self {
        Morpheme {
            surface: surface.to_string(),
            base_form: base_form.to_string(),
            part_of_speech: part_of_speech.to_string(),
        }
    }

    /// Base form, or the surface form when the base form is unknown.
    pub fn lemma(&self) -> &str {
        if self.base_form.is_empty() || self.base_form == UNKNOWN_BASE_FORM {
            &self.surface
        } else {
            &self.base_form
        }
    }
}

/// Splits one line of text into tagged morphemes, in order.
pub trait MorphAnalyzer {
    fn analyze(&self, line: &str) -> Result<Vec<Morpheme>>;
}

pub struct LinderaAnalyzer {
    tokenizer: Tokenizer,
}

impl LinderaAnalyzer {
    pub fn new() -> Result<Self> {
        let tokenizer = Tokenizer::new().map_err(|err| WcloudError::Analyzer(err.to_string()))?;
        Ok(LinderaAnalyzer { tokenizer })
    }
}

impl MorphAnalyzer for LinderaAnalyzer {
    fn analyze(&self, line: &str) -> Result<Vec<Morpheme>> {
        let tokens = self
            .tokenizer
            .tokenize(line)
            .map_err(|err| WcloudError::Analyzer(err.to_string()))?;

        Ok(tokens
            .iter()
            .map(|token| morpheme_from_detail(&token.text, &token.detail))
            .collect())
    }
}

/// Builds a morpheme from an IPADIC feature list.
///
/// Words outside the dictionary come back as a bare `UNK`. They are given the
/// category IPADIC's unknown-word table would: a noun, unless the run has no
/// letters or digits at all, in which case it is a symbol. Their base form is
/// unknown, so the surface stands in for it.
fn morpheme_from_detail(surface: &str, detail: &[String]) -> Morpheme {
    let part_of_speech = detail.get(POS_INDEX).map(String::as_str).unwrap_or_default();

    if part_of_speech == UNKNOWN_DETAIL {
        let category = if surface.chars().any(char::is_alphanumeric) {
            NOUN
        } else {
            SYMBOL
        };
        return Morpheme::new(surface, UNKNOWN_BASE_FORM, category);
    }

    let base_form = detail
        .get(BASE_FORM_INDEX)
        .map(String::as_str)
        .unwrap_or(UNKNOWN_BASE_FORM);
    Morpheme::new(surface, base_form, part_of_speech)
}

/// Which parts of speech survive tokenization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PosPolicy {
    /// Keep only the listed categories.
    Allow(HashSet<String>),
    /// Keep everything except the listed categories.
    Block(HashSet<String>),
}

impl PosPolicy {
    pub fn allow(categories: &[&str]) -> Self {
        PosPolicy::Allow(categories.iter().map(|el| el.to_string()).collect())
    }

    pub fn block(categories: &[&str]) -> Self {
        PosPolicy::Block(categories.iter().map(|el| el.to_string()).collect())
    }

    pub fn content_words() -> Self {
        Self::allow(&CONTENT_WORDS)
    }

    pub fn without_function_words() -> Self {
        Self::block(&FUNCTION_WORDS)
    }

    pub fn keeps(&self, part_of_speech: &str) -> bool {
        match self {
            PosPolicy::Allow(set) => set.contains(part_of_speech),
            PosPolicy::Block(set) => !set.contains(part_of_speech),
        }
    }
}

impl Default for PosPolicy {
    fn default() -> Self {
        Self::content_words()
    }
}

/// Lemmas of the morphemes in `line` that `policy` keeps, in order.
pub fn tokenize_line(
    line: &str,
    analyzer: &dyn MorphAnalyzer,
    policy: &PosPolicy,
) -> Result<Vec<String>> {
    let mut words = vec![];
    for morpheme in analyzer.analyze(line)? {
        if !policy.keeps(&morpheme.part_of_speech) {
            trace!(surface = %morpheme.surface, pos = %morpheme.part_of_speech, "dropped");
            continue;
        }

        let word = morpheme.lemma();
        if word.is_empty() || word == "\n" {
            continue;
        }
        words.push(word.to_string());
    }

    Ok(words)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Canned analyzer keyed by line.
    #[derive(Default)]
    pub(crate) struct FakeAnalyzer {
        pub lines: HashMap<String, Vec<Morpheme>>,
    }

    impl FakeAnalyzer {
        pub fn with_line(mut self, line: &str, morphemes: Vec<Morpheme>) -> Self {
            self.lines.insert(line.to_string(), morphemes);
            self
        }
    }

    impl MorphAnalyzer for FakeAnalyzer {
        fn analyze(&self, line: &str) -> Result<Vec<Morpheme>> {
            Ok(self.lines.get(line).cloned().unwrap_or_default())
        }
    }

    struct FailingAnalyzer;

    impl MorphAnalyzer for FailingAnalyzer {
        fn analyze(&self, _line: &str) -> Result<Vec<Morpheme>> {
            Err(WcloudError::Analyzer("dictionary not loaded".to_string()))
        }
    }

    pub(crate) fn cat_line() -> Vec<Morpheme> {
        vec![
            Morpheme::new("猫", "猫", "名詞"),
            Morpheme::new("は", "は", "助詞"),
            Morpheme::new("かわいい", "かわいい", "形容詞"),
            Morpheme::new("です", "です", "助動詞"),
            Morpheme::new("。", "。", "記号"),
        ]
    }

    #[test]
    fn content_words_keep_only_allowed_categories() {
        let analyzer = FakeAnalyzer::default().with_line("猫はかわいいです。", cat_line());
        let words =
            tokenize_line("猫はかわいいです。", &analyzer, &PosPolicy::content_words()).unwrap();
        assert_eq!(words, vec!["猫", "かわいい"]);
    }

    #[test]
    fn block_list_only_drops_function_words() {
        let analyzer = FakeAnalyzer::default().with_line("猫はかわいいです。", cat_line());
        let words = tokenize_line(
            "猫はかわいいです。",
            &analyzer,
            &PosPolicy::without_function_words(),
        )
        .unwrap();
        assert_eq!(words, vec!["猫", "かわいい", "。"]);
    }

    #[test]
    fn base_form_preferred_with_surface_fallback() {
        let analyzer = FakeAnalyzer::default().with_line(
            "走ったポケモン",
            vec![
                Morpheme::new("走っ", "走る", "動詞"),
                Morpheme::new("た", "た", "助動詞"),
                Morpheme::new("ポケモン", UNKNOWN_BASE_FORM, "名詞"),
                Morpheme::new("ピカ", "", "名詞"),
            ],
        );
        let words = tokenize_line("走ったポケモン", &analyzer, &PosPolicy::default()).unwrap();
        assert_eq!(words, vec!["走る", "ポケモン", "ピカ"]);
    }

    #[test]
    fn empty_and_newline_forms_are_dropped() {
        let analyzer = FakeAnalyzer::default().with_line(
            "x",
            vec![
                Morpheme::new("", "", "名詞"),
                Morpheme::new("\n", UNKNOWN_BASE_FORM, "名詞"),
                Morpheme::new("空", "空", "名詞"),
            ],
        );
        let words = tokenize_line("x", &analyzer, &PosPolicy::default()).unwrap();
        assert_eq!(words, vec!["空"]);
    }

    #[test]
    fn analyzer_failure_propagates() {
        let err = tokenize_line("猫", &FailingAnalyzer, &PosPolicy::default()).unwrap_err();
        assert!(matches!(err, WcloudError::Analyzer(_)));
    }

    fn detail(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|el| el.to_string()).collect()
    }

    #[test]
    fn unknown_words_become_nouns_or_symbols() {
        let unknown = detail(&["UNK"]);

        let python = morpheme_from_detail("Python", &unknown);
        assert_eq!(python.part_of_speech, NOUN);
        assert_eq!(python.lemma(), "Python");

        assert_eq!(morpheme_from_detail("ヂャバ", &unknown).part_of_speech, NOUN);
        assert_eq!(morpheme_from_detail("  ", &unknown).part_of_speech, SYMBOL);
        assert_eq!(morpheme_from_detail("->", &unknown).part_of_speech, SYMBOL);

        let policy = PosPolicy::content_words();
        assert!(policy.keeps(&python.part_of_speech));
        assert!(!policy.keeps(SYMBOL));
    }

    #[test]
    fn known_words_read_ipadic_fields() {
        let features = detail(&[
            "動詞", "自立", "*", "*", "五段・ラ行", "連用タ接続", "走る", "ハシッ", "ハシッ",
        ]);
        let morpheme = morpheme_from_detail("走っ", &features);
        assert_eq!(morpheme, Morpheme::new("走っ", "走る", "動詞"));

        let short = morpheme_from_detail("猫", &detail(&["名詞"]));
        assert_eq!(short.lemma(), "猫");
    }

    #[test]
    fn lindera_tags_ipadic_parts_of_speech() {
        let analyzer = LinderaAnalyzer::new().unwrap();
        let morphemes = analyzer.analyze("猫が走った").unwrap();
        let surfaces: Vec<&str> = morphemes.iter().map(|m| m.surface.as_str()).collect();
        assert_eq!(surfaces.concat(), "猫が走った");
        assert_eq!(morphemes[0].part_of_speech, "名詞");
        assert!(morphemes
            .iter()
            .any(|m| m.part_of_speech == "動詞" && m.lemma() == "走る"));

        let words =
            tokenize_line("PythonでAPIを作る", &analyzer, &PosPolicy::content_words()).unwrap();
        assert!(words.iter().any(|w| w == "Python"));
        assert!(words.iter().any(|w| w == "API"));
        assert!(words.iter().any(|w| w == "作る"));
    }
}
