use regex::Regex;
use std::sync::LazyLock;

static FORMAT_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Cf}").expect("format-char pattern is valid"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("blank-line pattern is valid"));

/// Strip invisible Unicode format characters (category Cf: zero-width spaces,
/// joiners, bidi marks, BOM) and squeeze runs of newlines into one.
pub fn normalize(s: &str) -> String {
    let stripped = FORMAT_CHARS.replace_all(s, "");
    BLANK_LINES.replace_all(&stripped, "\n").into_owned()
}
