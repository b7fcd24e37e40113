use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use tracing::debug;

use crate::config::CloudConfig;

type CaseCounts = BTreeMap<String, usize>;

/// Counts words in whitespace-separated (or plain English) text.
pub struct WordTokenizer {
    //分词正则
    regex: Regex,
    pub stopwords: HashSet<String>,
    pub min_word_length: usize,
    pub exclude_numbers: bool,
    pub normalize_plurals: bool,
    pub collocations: bool,
    pub collocation_threshold: f64,
    pub max_words: usize,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        WordTokenizer {
            regex: word_regex(0),
            stopwords: Default::default(),
            min_word_length: 0,
            exclude_numbers: true,
            normalize_plurals: true,
            collocations: true,
            collocation_threshold: 30.0,
            max_words: 200,
        }
    }
}

fn word_regex(min_word_length: usize) -> Regex {
    let pattern = if min_word_length <= 1 {
        r"\w[\w']*"
    } else {
        r"\w[\w']+"
    };
    Regex::new(pattern).expect("Unable to compile tokenization regex")
}

impl WordTokenizer {
    pub fn from_config(config: &CloudConfig) -> Self {
        WordTokenizer {
            regex: word_regex(config.min_word_length),
            stopwords: config.stopwords.clone(),
            min_word_length: config.min_word_length,
            exclude_numbers: config.exclude_numbers,
            normalize_plurals: config.normalize_plurals,
            collocations: config.collocations,
            collocation_threshold: config.collocation_threshold,
            max_words: config.max_words,
        }
    }

    pub fn with_min_word_length(mut self, size: usize) -> Self {
        self.min_word_length = size;
        self.regex = word_regex(size);
        self
    }

    pub fn with_max_words(mut self, size: usize) -> Self {
        self.max_words = size;
        self
    }

    pub fn with_stopwords(mut self, value: &[&str]) -> Self {
        self.stopwords = value.iter().map(|el| el.to_lowercase()).collect();
        self
    }

    pub fn with_exclude_numbers(mut self, value: bool) -> Self {
        self.exclude_numbers = value;
        self
    }

    pub fn with_collocations(mut self, value: bool) -> Self {
        self.collocations = value;
        self
    }

    fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    fn tokenize<'a>(&'a self, text: &'a str) -> Vec<&'a str> {
        let mut iter: Box<dyn Iterator<Item = &'a str> + 'a> = Box::new(
            self.regex
                .find_iter(text)
                .map(|mat| mat.as_str())
                .map(|word| {
                    word.strip_suffix("'s")
                        .or_else(|| word.strip_suffix("'S"))
                        .unwrap_or(word)
                })
                .filter(|word| !word.is_empty()),
        );

        if self.exclude_numbers {
            iter = Box::new(iter.filter(move |word| !word.chars().all(char::is_numeric)));
        }

        if self.min_word_length > 0 {
            iter = Box::new(iter.filter(|word| word.chars().count() >= self.min_word_length));
        }

        iter.collect()
    }

    pub fn get_word_frequencies(&self, text: &str) -> BTreeMap<String, usize> {
        let words = self.tokenize(text);

        let frequencies = if self.collocations {
            self.unigrams_and_bigrams(&words)
        } else {
            let words: Vec<&str> = words.into_iter().filter(|w| !self.is_stopword(w)).collect();
            Self::keep_common_case(&words, self.normalize_plurals).0
        };

        debug!(distinct = frequencies.len(), "counted words");
        frequencies
    }

    fn unigrams_and_bigrams(&self, words: &[&str]) -> BTreeMap<String, usize> {
        // bigrams come from the unfiltered sequence so stopwords are never bridged over
        let bigrams: Vec<String> = words
            .windows(2)
            .filter(|pair| !pair.iter().any(|w| self.is_stopword(w)))
            .map(|pair| pair.join(" "))
            .collect();
        let unigrams: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| !self.is_stopword(w))
            .collect();
        let n_words = unigrams.len();

        let (mut counts, standard_form) = Self::keep_common_case(&unigrams, self.normalize_plurals);
        let bigram_refs: Vec<&str> = bigrams.iter().map(String::as_str).collect();
        let (counts_bigrams, _) = Self::keep_common_case(&bigram_refs, self.normalize_plurals);
        let original_counts = counts.clone();

        for (bigram, count) in &counts_bigrams {
            let Some((first, second)) = bigram.split_once(' ') else {
                continue;
            };
            let (Some(word1), Some(word2)) = (
                standard_form.get(&first.to_lowercase()),
                standard_form.get(&second.to_lowercase()),
            ) else {
                continue;
            };

            let score = collocation_score(
                *count,
                original_counts.get(word1).copied().unwrap_or(0),
                original_counts.get(word2).copied().unwrap_or(0),
                n_words,
            );
            if score > self.collocation_threshold {
                debug!(%bigram, score, "collocation");
                // a word can sit in several collocations; its count stops at zero
                for word in [word1, word2] {
                    if let Some(entry) = counts.get_mut(word) {
                        *entry = entry.saturating_sub(*count);
                    }
                }
                counts.insert(bigram.clone(), *count);
            }
        }

        counts.retain(|_, count| *count > 0);
        counts
    }

    /// Fuses case variants under their most common spelling.
    ///
    /// Returns the fused counts and, for every lowercased word, the spelling it was fused into.
    fn keep_common_case(
        words: &[&str],
        normalize_plurals: bool,
    ) -> (BTreeMap<String, usize>, BTreeMap<String, String>) {
        let mut common_cases = BTreeMap::<String, CaseCounts>::new();
        for word in words {
            *common_cases
                .entry(word.to_lowercase())
                .or_default()
                .entry(word.to_string())
                .or_insert(0) += 1;
        }

        let mut merged_plurals = BTreeMap::new();
        if normalize_plurals {
            let plurals: Vec<String> = common_cases
                .keys()
                .filter(|key| key.ends_with('s') && !key.ends_with("ss"))
                .cloned()
                .collect();
            for plural in plurals {
                let singular = plural[..plural.len() - 1].to_string();
                if !common_cases.contains_key(&singular) {
                    continue;
                }
                if let Some(cases) = common_cases.remove(&plural) {
                    let singular_cases = common_cases.entry(singular.clone()).or_default();
                    for (word, count) in cases {
                        *singular_cases
                            .entry(word[..word.len() - 1].to_string())
                            .or_insert(0) += count;
                    }
                }
                merged_plurals.insert(plural, singular);
            }
        }

        let mut fused = BTreeMap::new();
        let mut standard_form = BTreeMap::new();
        for (lower, cases) in common_cases {
            let mut most_common_case: Vec<(&String, &usize)> = cases.iter().collect();
            most_common_case.sort_by(|a, b| {
                if a.1 != b.1 {
                    b.1.cmp(a.1)
                } else {
                    b.0.cmp(a.0)
                }
            });

            let first = most_common_case[0].0.clone();
            fused.insert(first.clone(), cases.values().sum());
            standard_form.insert(lower, first);
        }

        for (plural, singular) in merged_plurals {
            if let Some(form) = standard_form.get(&singular).cloned() {
                standard_form.insert(plural, form);
            }
        }

        (fused, standard_form)
    }

    pub fn get_normalized_word_frequencies(&self, text: &str) -> Vec<(String, f32)> {
        let frequencies = self.get_word_frequencies(text);

        let Some(max_freq) = frequencies.values().max().copied() else {
            return vec![];
        };
        let max_freq = max_freq as f32;

        let mut normalized_freqs: Vec<(String, f32)> = frequencies
            .into_iter()
            .map(|(key, val)| (key, val as f32 / max_freq))
            .collect();

        normalized_freqs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        if self.max_words > 0 {
            normalized_freqs.truncate(self.max_words);
        }

        normalized_freqs
    }
}

fn log_likelihood(k: f64, n: f64, x: f64) -> f64 {
    x.max(1e-10).ln() * k + (1.0 - x).max(1e-10).ln() * (n - k)
}

/// Dunning's log-likelihood ratio for a bigram.
fn collocation_score(count_bigram: usize, count1: usize, count2: usize, n_words: usize) -> f64 {
    if n_words <= count1 || n_words <= count2 {
        return 0.0;
    }
    let (c12, c1, c2, n) = (
        count_bigram as f64,
        count1 as f64,
        count2 as f64,
        n_words as f64,
    );
    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);
    let score = log_likelihood(c12, c1, p) + log_likelihood(c2 - c12, n - c1, p)
        - log_likelihood(c12, c1, p1)
        - log_likelihood(c2 - c12, n - c1, p2);
    -2.0 * score
}
