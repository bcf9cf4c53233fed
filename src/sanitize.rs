//! LaTeX delimiter stripping for model answers.
//!
//! Chat models like to wrap calculations in `\[ ... \]`, `\( ... \)` and
//! `\text{...}`. Neither the terminal nor the web form renders LaTeX, so the
//! wrappers are removed while the math inside them is kept.

use regex::Regex;
use std::sync::OnceLock;

fn display_math() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\[|\\\]").expect("display math pattern is valid"))
}

fn inline_math() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\\(|\\\)").expect("inline math pattern is valid"))
}

fn text_wrapper() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\text\{(.*?)\}").expect("text wrapper pattern is valid"))
}

/// Strip LaTeX math delimiters from `response`, keeping their content.
///
/// Passes are repeated until nothing changes, so removing one delimiter can
/// never leave a new one behind and the function is idempotent.
pub fn clean_latex(response: &str) -> String {
    let mut current = response.to_string();

    loop {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    current.trim().to_string()
}

fn strip_once(text: &str) -> String {
    let text = display_math().replace_all(text, "");
    let text = inline_math().replace_all(&text, "");
    text_wrapper().replace_all(&text, "$1").into_owned()
}
