use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    cleaner::clean_text,
    error::{Result, WcloudError},
    morph::{tokenize_line, MorphAnalyzer, PosPolicy},
};

const WAKATI_SUFFIX: &str = "_wakati.txt";

/// `notes/diary.txt` -> `notes/diary_wakati.txt`.
///
/// The file lands beside the input, whatever the current directory is. Pass an
/// explicit output path to `tokenize_file` to put it elsewhere.
pub fn default_wakati_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{WAKATI_SUFFIX}"))
}

/// 分かち書き: one line of space-joined words per line of `text`.
pub fn wakati_text(text: &str, analyzer: &dyn MorphAnalyzer, policy: &PosPolicy) -> Result<String> {
    let cleaned = clean_text(text);
    let mut out = String::with_capacity(cleaned.len());

    for (i, line) in cleaned.lines().enumerate() {
        let words = tokenize_line(line, analyzer, policy)?;
        debug!(line = i + 1, words = words.len(), "tokenized");
        out.push_str(&words.join(" "));
        out.push('\n');
    }

    Ok(out)
}

/// Writes the wakati form of `input` and returns where it went.
pub fn tokenize_file(
    input: &Path,
    output: Option<&Path>,
    analyzer: &dyn MorphAnalyzer,
    policy: &PosPolicy,
) -> Result<PathBuf> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_wakati_path(input));

    let text = fs::read_to_string(input).map_err(|err| WcloudError::io(input, err))?;
    let wakati = wakati_text(&text, analyzer, policy)?;
    fs::write(&output, wakati).map_err(|err| WcloudError::io(&output, err))?;

    info!(input = %input.display(), output = %output.display(), "wrote wakati file");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::morph::{
        tests::{cat_line, FakeAnalyzer},
        Morpheme,
    };

    #[test]
    fn default_path_sits_beside_the_input() {
        assert_eq!(
            default_wakati_path(Path::new("notes/diary.txt")),
            Path::new("notes/diary_wakati.txt")
        );
        assert_eq!(default_wakati_path(Path::new("diary")), Path::new("diary_wakati.txt"));
    }

    #[test]
    fn blank_lines_are_preserved() {
        let analyzer = FakeAnalyzer::default()
            .with_line("猫はかわいいです。", cat_line())
            .with_line("走った", vec![Morpheme::new("走っ", "走る", "動詞")]);
        let text = "猫はかわいいです。[参照]\n\n走った\n";
        let out = wakati_text(text, &analyzer, &PosPolicy::default()).unwrap();
        assert_eq!(out, "猫 かわいい\n\n走る\n");
        assert_eq!(out.lines().count(), text.lines().count());
    }

    #[test]
    fn stray_angle_bracket_keeps_line_count() {
        let analyzer = FakeAnalyzer::default()
            .with_line("本文の二行目", vec![Morpheme::new("本文", "本文", "名詞")]);
        let text = "1 < 2 である\n本文の二行目\n矢印 -> 次\n";
        let out = wakati_text(text, &analyzer, &PosPolicy::default()).unwrap();
        assert_eq!(out, "\n本文\n\n");
        assert_eq!(out.lines().count(), text.lines().count());
    }

    #[test]
    fn writes_to_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("diary.txt");
        fs::write(&input, "猫はかわいいです。\n").unwrap();

        let analyzer = FakeAnalyzer::default().with_line("猫はかわいいです。", cat_line());
        let output = tokenize_file(&input, None, &analyzer, &PosPolicy::default()).unwrap();

        assert_eq!(output, dir.path().join("diary_wakati.txt"));
        assert_eq!(fs::read_to_string(output).unwrap(), "猫 かわいい\n");
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = tokenize_file(
            &dir.path().join("nope.txt"),
            None,
            &FakeAnalyzer::default(),
            &PosPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, WcloudError::Io { .. }));
    }
}
