use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    brackets: Regex,
    uris: Regex,
    tags: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        brackets: Regex::new(r"\[.*?\]").expect("Unable to compile bracket regex"),
        uris: Regex::new(r"https?://[\w/:%#$&?()~.=+\-]+").expect("Unable to compile uri regex"),
        tags: Regex::new(r"</?[^<>\n]+>").expect("Unable to compile tag regex"),
    })
}

/// Strips `[annotations]`, http(s) URIs and HTML-like tags.
pub fn clean_text(text: &str) -> String {
    let patterns = patterns();
    let text = patterns.brackets.replace_all(text, "");
    let text = patterns.uris.replace_all(&text, "");
    let text = patterns.tags.replace_all(&text, "");
    text.into_owned()
}
