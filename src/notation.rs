//! Math-notation delimiter normalization
//!
//! Upstream models emit mathematical markup in several inconsistent
//! delimiter conventions: `\[ ... \]` blocks, bare `[ ... ]` blocks,
//! single-`$` spans that are really display math, and truncated spans
//! missing their opening marker. The terminal renderer understands exactly
//! one convention: `$$ ... $$` for block notation and `$ ... $` for inline.
//!
//! [`normalize`] rewrites text into that canonical convention through an
//! ordered pipeline of pattern rules. Already-canonical spans are protected
//! with placeholder tokens before any rewriting so no later pass can touch
//! their interior, and restored verbatim at the end. Narrow, high-precision
//! rules run before the permissive catch-all so structured content that
//! merely resembles notation (link syntax, parenthesized prose) survives.
//!
//! Every rule is a best-effort heuristic: a span that cannot be classified
//! confidently is left unchanged, and no input can make the pipeline fail.
//! The function is pure and idempotent on its own output.

use regex::Regex;
use std::sync::OnceLock;

/// Longest single-line `$...$` span protected as already-canonical inline
///
/// Longer spans are left in place as candidates for block promotion; they
/// are more likely to be malformed display math than genuine inline spans.
const INLINE_SPAN_MAX_LEN: usize = 100;

/// Interior length beyond which an unprotected `$...$` span is promoted
/// to block form (when it contains an escape sequence)
const BLOCK_PROMOTE_MIN_LEN: usize = 100;

/// Placeholder sentinel; a private-use codepoint keeps tokens out of the
/// reach of every pattern in the pipeline
const SENTINEL: char = '\u{E000}';

macro_rules! static_regex {
    ($pattern:expr) => {{
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new($pattern).expect("hardcoded pattern compiles"))
    }};
}

/// Working text plus the protected spans carved out of it
///
/// `saved` is kept in creation order; any saved span can only embed tokens
/// created before it, so restoring newest-first resolves nesting.
struct Protected {
    text: String,
    saved: Vec<(String, String)>,
}

impl Protected {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            saved: Vec::new(),
        }
    }

    fn restore(mut self) -> String {
        for (token, original) in self.saved.iter().rev() {
            self.text = self.text.replace(token, original);
        }
        self.text
    }
}

/// True when the text contains a command-style escape sequence
fn has_escape(text: &str) -> bool {
    static_regex!(r"\\[a-zA-Z]").is_match(text)
}

/// Occurrences of the fraction escape, the strongest block-notation signal
fn frac_count(text: &str) -> usize {
    text.matches(r"\frac").count()
}

/// Rewrite mixed math-notation delimiters into the canonical convention
///
/// Safe on text that is already canonical and on prose containing no
/// notation at all; in both cases the output equals the input.
///
/// # Examples
///
/// ```
/// use arenachat::notation::normalize;
///
/// assert_eq!(normalize(r"\[ E = mc^2 \]"), "$$ E = mc^2 $$");
/// assert_eq!(normalize("(see appendix)"), "(see appendix)");
/// ```
pub fn normalize(text: &str) -> String {
    let mut p = Protected::new(text);

    // Passes 1-2: carve out everything that is already canonical.
    protect_blocks(&mut p);
    protect_inline(&mut p);

    // Passes 3-6: block-notation repairs, most specific first. Each pass
    // re-protects the blocks it produces so no later rule can see them.
    repair_missing_opener(&mut p);
    protect_blocks(&mut p);
    convert_bracket_blocks(&mut p);
    protect_blocks(&mut p);
    repair_unterminated_bracket(&mut p);
    protect_blocks(&mut p);
    promote_inline_spans(&mut p);
    protect_blocks(&mut p);

    // Passes 7-8: narrow inline conversions for recurring upstream
    // artifacts.
    convert_parenthesized_subscript(&mut p);
    convert_limit_expression(&mut p);

    // Pass 9: the permissive bracket catch-all, deliberately last among
    // the conversions.
    convert_generic_brackets(&mut p);
    protect_blocks(&mut p);

    // Pass 10: stray closing markers with no open.
    cleanup_orphan_markers(&mut p);

    // Pass 11: put the protected spans back.
    p.restore()
}

/// Pass 1: protect `$$...$$` spans
fn protect_blocks(p: &mut Protected) {
    let re = static_regex!(r"(?s)\$\$.+?\$\$");
    let text = std::mem::take(&mut p.text);
    let saved = &mut p.saved;
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            let token = format!("{}{}{}", SENTINEL, saved.len(), SENTINEL);
            saved.push((token.clone(), caps[0].to_string()));
            token
        })
        .into_owned();
}

/// Pass 2: protect short single-line `$...$` spans
///
/// Multi-line, overlong, and fraction-heavy spans stay in the text: they
/// are the raw material for the promotion pass.
fn protect_inline(p: &mut Protected) {
    let re = static_regex!(r"\$([^\s$][^$\n]*?)\$");
    let text = std::mem::take(&mut p.text);
    let saved = &mut p.saved;
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            let whole = caps[0].to_string();
            let interior = &whole[1..whole.len() - 1];
            let protectable = interior.chars().count() <= INLINE_SPAN_MAX_LEN
                && !interior.ends_with(char::is_whitespace)
                && frac_count(interior) <= 1;
            if protectable {
                let token = format!("{}{}{}", SENTINEL, saved.len(), SENTINEL);
                saved.push((token.clone(), whole));
                token
            } else {
                whole
            }
        })
        .into_owned();
}

/// Pass 3: synthesize a missing opening marker
///
/// A common upstream truncation leaves an escape sequence running straight
/// into a closing `$$` with no opener. Balanced pairs were already
/// protected, so any `$$` seen here is unmatched.
fn repair_missing_opener(p: &mut Protected) {
    let re = static_regex!(r"(\\[a-zA-Z]+[^$\n]*)\$\$");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            format!("$${}$$", &caps[1])
        })
        .into_owned();
}

/// Pass 4: convert complete `\[ ... \]` spans to block form
fn convert_bracket_blocks(p: &mut Protected) {
    let re = static_regex!(r"(?s)\\\[(.*?)\\\]");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            format!("$${}$$", &caps[1])
        })
        .into_owned();
}

/// Pass 5: close an unterminated `\[` at the next paragraph break
///
/// Only fires when the interior carries an escape sequence; an unmatched
/// `\[` in plain prose is left alone.
fn repair_unterminated_bracket(p: &mut Protected) {
    let re = static_regex!(r"(?s)\\\[(.*?)(\n[ \t]*\n|\z)");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            let interior = &caps[1];
            let terminator = &caps[2];
            if interior.contains(r"\]") || !has_escape(interior) {
                return caps[0].to_string();
            }
            format!("$${}$${}", interior, terminator)
        })
        .into_owned();
}

/// Pass 6: promote single-`$` spans that are really display math
///
/// A span qualifies when it contains an escape sequence and is multi-line,
/// fraction-heavy, or overlong. Anything else keeps its single markers.
fn promote_inline_spans(p: &mut Protected) {
    let re = static_regex!(r"(?s)\$([^$]+?)\$");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            let interior = &caps[1];
            let promote = has_escape(interior)
                && (interior.contains('\n')
                    || frac_count(interior) > 1
                    || interior.chars().count() > BLOCK_PROMOTE_MIN_LEN);
            if promote {
                format!("$${}$$", interior)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();
}

/// Pass 7: wrap the `(ident_\text{...}) =` artifact in inline markers
///
/// Line-anchored and shaped tightly around the upstream rendering bug so
/// generic parenthesized prose can never match.
fn convert_parenthesized_subscript(p: &mut Protected) {
    let re = static_regex!(
        r"(?m)^([ \t]*)\(([A-Za-z][A-Za-z0-9]*_\{?\\text\{[^{}\n]*\}\}?)\)([ \t]*=)"
    );
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            format!("{}$({})${}", &caps[1], &caps[2], &caps[3])
        })
        .into_owned();
}

/// Pass 8: wrap the `(ident \to \infty)` artifact in inline markers
fn convert_limit_expression(p: &mut Protected) {
    let re = static_regex!(r"\(([A-Za-z][A-Za-z0-9]*\s*\\to\s*\\infty)\)");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            format!("$({})$", &caps[1])
        })
        .into_owned();
}

/// Pass 9: convert any remaining bracket span holding an escape sequence
///
/// The most permissive rule, so it runs after every narrower one. Requiring
/// an escape in the interior is what keeps link syntax and other bracketed
/// prose intact. A trailing brace group is folded into the block.
fn convert_generic_brackets(p: &mut Protected) {
    let re = static_regex!(r"(?s)\[([^\[\]]*?)\](\{[^{}]*\})?");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| {
            let interior = &caps[1];
            if !has_escape(interior) {
                return caps[0].to_string();
            }
            let brace_group = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            format!("$${}{}$$", interior, brace_group)
        })
        .into_owned();
}

/// Pass 10: delete a stray closing `$$` in front of prose
///
/// Balanced pairs are all tokenized by now, so `$$` followed by whitespace
/// and a letter is an orphan with no matching open.
fn cleanup_orphan_markers(p: &mut Protected) {
    let re = static_regex!(r"\$\$\s+([A-Za-z])");
    let text = std::mem::take(&mut p.text);
    p.text = re
        .replace_all(&text, |caps: &regex::Captures| caps[1].to_string())
        .into_owned();
}
