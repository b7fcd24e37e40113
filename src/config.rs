use std::{collections::HashSet, path::PathBuf};

use crate::stopwords;

pub const BG_COLOR: &str = "white";
pub const FONT_FILE: &str = "SourceHanCodeJP-Regular.otf";
pub const RANDOM_SEED: u64 = 2019;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Japanese,
    /// Already whitespace separated; skips morphological analysis.
    English,
}

/// Everything the renderer needs, fixed before a run starts.
#[derive(Clone, Debug)]
pub struct CloudConfig {
    pub font_path: PathBuf,
    /// Any CSS color, e.g. `white` or `#1e1e1e`.
    pub background_color: String,
    pub rng_seed: Option<u64>,
    pub stopwords: HashSet<String>,
    pub width: u32,
    pub height: u32,
    pub collocations: bool,
    pub collocation_threshold: f64,
    pub max_words: usize,
    pub min_font_size: f32,
    pub max_font_size: Option<f32>,
    pub font_step: f32,
    pub word_margin: u32,
    pub prefer_horizontal: f64,
    pub relative_font_scaling: f32,
    pub normalize_plurals: bool,
    pub exclude_numbers: bool,
    pub min_word_length: usize,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            font_path: PathBuf::from(FONT_FILE),
            background_color: BG_COLOR.to_string(),
            rng_seed: Some(RANDOM_SEED),
            stopwords: Default::default(),
            width: 400,
            height: 200,
            collocations: true,
            collocation_threshold: 30.0,
            max_words: 200,
            min_font_size: 4.0,
            max_font_size: None,
            font_step: 1.0,
            word_margin: 2,
            prefer_horizontal: 0.9,
            relative_font_scaling: 0.5,
            normalize_plurals: true,
            exclude_numbers: true,
            min_word_length: 0,
        }
    }
}

impl CloudConfig {
    /// Pre-tokenized Japanese: fixed 800x400 canvas, no collocations.
    pub fn japanese() -> Self {
        CloudConfig::default()
            .with_stopwords(stopwords::JAPANESE)
            .with_size(800, 400)
            .with_collocations(false)
    }

    pub fn english() -> Self {
        CloudConfig::default().with_stopwords(stopwords::ENGLISH)
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Japanese => Self::japanese(),
            Language::English => Self::english(),
        }
    }

    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = path.into();
        self
    }

    pub fn with_stopwords(mut self, value: &[&str]) -> Self {
        self.stopwords = value.iter().map(|el| el.to_lowercase()).collect();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_collocations(mut self, value: bool) -> Self {
        self.collocations = value;
        self
    }
}
