//! Text normalisation: storage-format markup → clean plain text.
//!
//! Deterministic and pure: the same input always yields the same output, and
//! the passes are fixpoints on their own output, so normalising
//! already-normalised text returns it unchanged.
//!
//! Pass order matters: noise stripping must run before the HTML conversion
//! (so macro plumbing never reaches the converter), and the markdown-artifact
//! cleanup must run before whitespace collapsing (removing markers can leave
//! blank lines behind).

use once_cell::sync::Lazy;
use regex::Regex;

/// Width passed to the HTML converter — wide enough that prose is never
/// artificially wrapped.
const NO_WRAP_WIDTH: usize = 2000;

// ── Noise stripping ─────────────────────────────────────────────────────────

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());

// Macro plumbing whose content is not human prose.
static RE_AC_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ac:parameter[^>]*>.*?</ac:parameter>").unwrap());
static RE_AC_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ac:placeholder[^>]*>.*?</ac:placeholder>").unwrap());

// CDATA sections carry prose (code macro bodies); keep the inner text.
static RE_CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

// Remaining namespaced tags are wrappers: drop the tags, keep their content.
static RE_NAMESPACED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:ac|ri):[a-z0-9-]+[^>]*>").unwrap());

// ── Markdown artifacts the HTML converter emits ─────────────────────────────

static RE_LINK_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\[\d+\]:\s+\S.*$").unwrap());
static RE_LINK_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]\[]*)\]\[\d+\]").unwrap());
static RE_HEADING_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s*").unwrap());

// ── Whitespace rules ────────────────────────────────────────────────────────

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

// Signals the converter would act on: an element storage format actually
// emits, a comment/CDATA opener, or a character entity. Deliberately NOT
// `</?[a-zA-Z]`: the converter decodes entities, so normalized output can
// contain literal `<word>` prose (e.g. a `&lt;team-name&gt;` placeholder),
// and a broad gate would send that text back through the converter, which
// eats it as an unknown tag.
static RE_HAS_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|span|br|hr|h[1-6]|ul|ol|li|dl|dt|dd|table|thead|tbody|tr|td|th|a|img|strong|em|b|i|u|s|sub|sup|code|pre|blockquote|time|ac:[a-z0-9-]+|ri:[a-z0-9-]+)[\s/>]|<!|&[a-z]+;|&#[0-9]+;",
    )
    .unwrap()
});

/// Normalise storage-format markup to clean plain text.
pub fn normalize(body_html: &str) -> String {
    let s = strip_noise(body_html);
    let s = if RE_HAS_MARKUP.is_match(&s) {
        html2text::from_read(s.as_bytes(), NO_WRAP_WIDTH)
    } else {
        s
    };
    let s = strip_markdown_artifacts(&s);
    collapse_whitespace(&s)
}

/// Remove non-content elements and unwrap Confluence macro plumbing.
fn strip_noise(input: &str) -> String {
    let s = RE_SCRIPT.replace_all(input, "");
    let s = RE_STYLE.replace_all(&s, "");
    let s = RE_AC_PARAMETER.replace_all(&s, "");
    let s = RE_AC_PLACEHOLDER.replace_all(&s, "");
    let s = RE_CDATA.replace_all(&s, "$1");
    RE_NAMESPACED_TAG.replace_all(&s, "").to_string()
}

/// Strip the emphasis, heading, and link-reference markers the converter
/// leaves behind, keeping the text itself.
fn strip_markdown_artifacts(input: &str) -> String {
    let s = input.replace("**", "");
    let s = RE_LINK_FOOTNOTE.replace_all(&s, "");
    let s = RE_LINK_INLINE.replace_all(&s, "$1");
    RE_HEADING_MARKS.replace_all(&s, "").to_string()
}

/// Trim trailing whitespace per line, collapse runs of 3+ blank lines to
/// exactly one, trim the ends.
fn collapse_whitespace(input: &str) -> String {
    let trimmed: String = input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    RE_BLANK_RUNS.replace_all(&trimmed, "\n\n").trim().to_string()
}
