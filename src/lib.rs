use std::{fs, path::Path};

use ab_glyph::{point, FontVec, Point, PxScale};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use nanorand::{Rng, WyRand};
use palette::{Hsl, IntoColor, Pixel, Srgb};
use sat::Rect;
use text::GlyphData;
use tracing::{debug, info};

pub use cleaner::clean_text;
pub use config::{CloudConfig, Language};
pub use error::{Result, WcloudError};
pub use morph::{tokenize_line, LinderaAnalyzer, Morpheme, MorphAnalyzer, PosPolicy};
pub use pipeline::{render_cloud, CloudFiles, Wakati, Workspace};
pub use tokenizer::WordTokenizer;
pub use wakati::{default_wakati_path, tokenize_file, wakati_text};

mod cleaner;
mod config;
mod error;
mod morph;
mod pipeline;
mod sat;
pub mod stopwords;
mod text;
mod tokenizer;
mod wakati;

pub type ColorFunc = fn(&Word, &mut WyRand) -> Rgba<u8>;

pub struct Word<'a> {
    pub text: &'a str,
    pub font: &'a FontVec,
    pub font_size: PxScale,
    pub glyphs: GlyphData,
    pub rotated: bool,
    pub position: Point,
    pub frequency: f32,
    pub index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordCloudSize {
    FromDimensions { width: u32, height: u32 },
}

/// Turns a body of text into a word cloud image.
pub trait CloudRenderer {
    fn render(&self, text: &str) -> Result<RgbaImage>;
}

pub struct WordCloud {
    tokenizer: WordTokenizer,
    background_color: Rgba<u8>,
    pub font: FontVec,
    size: WordCloudSize,
    min_font_size: f32,
    max_font_size: Option<f32>,
    font_step: f32,
    word_margin: u32,
    prefer_horizontal: f64,
    relative_font_scaling: f32,
    rng_seed: Option<u64>,
}

fn load_font(path: &Path) -> Result<FontVec> {
    let font_file = fs::read(path).map_err(|err| WcloudError::io(path, err))?;
    FontVec::try_from_vec(font_file).map_err(|err| WcloudError::InvalidFont(err.to_string()))
}

fn parse_color(value: &str) -> Result<Rgba<u8>> {
    let color = csscolorparser::parse(value)
        .map_err(|err| WcloudError::InvalidColor(format!("{value}: {err}")))?;
    Ok(Rgba(color.to_rgba8()))
}

/// Uniform in `[0, 1]`.
fn chance(rng: &mut WyRand) -> f64 {
    rng.generate::<u32>() as f64 / u32::MAX as f64
}

impl WordCloud {
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let font = load_font(&config.font_path)?;

        Ok(WordCloud {
            tokenizer: WordTokenizer::from_config(config),
            background_color: parse_color(&config.background_color)?,
            font,
            size: WordCloudSize::FromDimensions {
                width: config.width,
                height: config.height,
            },
            min_font_size: config.min_font_size,
            max_font_size: config.max_font_size,
            font_step: config.font_step,
            word_margin: config.word_margin,
            prefer_horizontal: config.prefer_horizontal,
            relative_font_scaling: config.relative_font_scaling,
            rng_seed: config.rng_seed,
        })
    }

    fn new_rng(&self) -> WyRand {
        match self.rng_seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        }
    }

    fn generate_from_word_positions(
        rng: &mut WyRand,
        width: u32,
        height: u32,
        word_positions: Vec<Word>,
        background_color: Rgba<u8>,
        color_func: ColorFunc,
    ) -> RgbaImage {
        let mut final_image_buffer = RgbaImage::from_pixel(width, height, background_color);

        for word in word_positions {
            let col = color_func(&word, rng);

            text::draw_glyphs_to_rgba_buffer(
                &mut final_image_buffer,
                &word.glyphs,
                word.font,
                word.position,
                word.rotated,
                col,
            )
        }

        final_image_buffer
    }

    pub fn generate_from_text(&self, text: &str) -> Result<RgbaImage> {
        self.generate_from_text_with_color_func(text, random_color_rgba)
    }

    pub fn generate_from_text_with_color_func(
        &self,
        text: &str,
        color_func: ColorFunc,
    ) -> Result<RgbaImage> {
        let words = self.tokenizer.get_normalized_word_frequencies(text);
        if words.is_empty() {
            return Err(WcloudError::NoWords);
        }

        let WordCloudSize::FromDimensions { width, height } = self.size;

        let font_size = match self.max_font_size {
            Some(max_font_size) => max_font_size,
            None => self.initial_font_size(&words, width, height)?,
        };

        let mut rng = self.new_rng();
        let final_words = self.layout_words(&words, width, height, font_size, &mut rng);
        info!(
            placed = final_words.len(),
            counted = words.len(),
            width,
            height,
            "laid out word cloud"
        );

        Ok(WordCloud::generate_from_word_positions(
            &mut rng,
            width,
            height,
            final_words,
            self.background_color,
            color_func,
        ))
    }

    /// Sizes the top two words on an empty canvas to pick the starting size.
    fn initial_font_size(&self, words: &[(String, f32)], width: u32, height: u32) -> Result<f32> {
        if words.len() == 1 {
            return Ok(height as f32);
        }

        let mut rng = self.new_rng();
        let trial = self.layout_words(&words[..2], width, height, height as f32, &mut rng);
        let sizes: Vec<f32> = trial.iter().map(|word| word.font_size.y).collect();

        match sizes.as_slice() {
            [first, second, ..] => Ok((2.0 * first * second / (first + second)).trunc()),
            [first] => Ok(*first),
            [] => Err(WcloudError::NoSpace),
        }
    }

    fn layout_words<'a>(
        &'a self,
        words: &'a [(String, f32)],
        width: u32,
        height: u32,
        start_font_size: f32,
        rng: &mut WyRand,
    ) -> Vec<Word<'a>> {
        let mut gray_buffer = GrayImage::from_pixel(width, height, Luma([0]));
        let mut summed_area_table = vec![0u32; (width * height) as usize];

        let mut final_words = Vec::with_capacity(words.len());
        let mut font_size = start_font_size;
        let mut last_freq = 1.0;

        for (index, (word, freq)) in words.iter().enumerate() {
            let rs = self.relative_font_scaling;
            if rs != 0.0 {
                font_size = ((rs * (freq / last_freq) + (1.0 - rs)) * font_size).round();
            }

            let mut rotated = chance(rng) >= self.prefer_horizontal;
            let mut tried_other_orientation = false;

            let found = loop {
                if font_size < self.min_font_size {
                    break None;
                }

                let glyphs = text::text_to_glyphs(word, &self.font, PxScale::from(font_size));
                let (word_width, word_height) = glyphs.extent(rotated);
                let rect = Rect {
                    width: word_width + self.word_margin,
                    height: word_height + self.word_margin,
                };
                if let Some(pos) =
                    sat::find_space_for_rect(&summed_area_table, width, height, &rect, rng)
                {
                    break Some((pos, glyphs));
                }

                if !tried_other_orientation && self.prefer_horizontal < 1.0 {
                    rotated = !rotated;
                    tried_other_orientation = true;
                } else {
                    font_size -= self.font_step;
                    rotated = false;
                }
            };

            let Some((pos, glyphs)) = found else {
                debug!(word = %word, "font size fell below minimum, stopping");
                break;
            };

            let margin = self.word_margin / 2;
            let position = point((pos.x + margin) as f32, (pos.y + margin) as f32);
            text::draw_glyphs_to_gray_buffer(&mut gray_buffer, &glyphs, &self.font, position, rotated);

            // glyph overhang stays within one line height above the word
            let start_row = pos.y.saturating_sub(glyphs.height) as usize;
            let row_start = start_row * width as usize;
            summed_area_table[row_start..]
                .iter_mut()
                .zip(gray_buffer.as_raw()[row_start..].iter())
                .for_each(|(cell, px)| *cell = *px as u32);
            sat::to_summed_area_table(&mut summed_area_table, width as usize, start_row);

            debug!(word = %word, font_size, rotated, x = position.x, y = position.y, "placed");
            final_words.push(Word {
                text: word,
                font: &self.font,
                font_size: PxScale::from(font_size),
                glyphs,
                rotated,
                position,
                frequency: *freq,
                index,
            });
            last_freq = *freq;
        }

        final_words
    }
}

impl CloudRenderer for WordCloud {
    fn render(&self, text: &str) -> Result<RgbaImage> {
        self.generate_from_text(text)
    }
}

/// A hue byte spread over the whole colour wheel.
fn hue_degrees(hue: u8) -> f32 {
    hue as f32 * 360.0 / 255.0
}

/// hsl(random hue, 80%, 50%)
pub fn random_color_rgba(_: &Word, rng: &mut WyRand) -> Rgba<u8> {
    let hue: u8 = rng.generate_range(0..=255);

    let col = Hsl::new(hue_degrees(hue), 0.8, 0.5);
    let rgb: Srgb = col.into_color();

    let raw: [u8; 3] = rgb.into_format().into_raw();

    Rgba([raw[0], raw[1], raw[2], 255])
}
