//! Text shaping for Hive post bodies.
//!
//! Hive stores markdown (frequently with embedded HTML) on chain. These
//! helpers reduce that to something a terminal can show: short excerpts for
//! the list pane and paragraph blocks for the reading view.

use chrono::NaiveDateTime;

/// Condenser timestamps look like `2024-01-01T00:00:00` (UTC, no offset).
const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_created(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), CREATED_FORMAT).ok()
}

/// List-row date: "02/01/2024"
pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format("%d/%m/%Y").to_string()
}

/// Reading-view date: "02/01/2024 15:04"
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// Parse the leading decimal of an asset string like `"1.234 HBD"`.
/// Anything unparsable counts as zero, matching how the upstream API treats
/// missing payouts.
pub fn parse_amount_prefix(raw: &str) -> f64 {
    let t = raw.trim();
    let end = t
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(t.len());
    t[..end].parse().unwrap_or(0.0)
}

pub fn format_payout(value: f64) -> String {
    format!("{value:.2}")
}

/// Compact vote score for list rows. Raw rshares run into the trillions, so
/// collapse to K/M/B/T with one decimal; the sign survives.
pub fn format_score(score: i64) -> String {
    let sign = if score < 0 { "-" } else { "" };
    let mag = score.unsigned_abs();
    let (value, unit) = if mag >= 1_000_000_000_000 {
        (mag as f64 / 1e12, "T")
    } else if mag >= 1_000_000_000 {
        (mag as f64 / 1e9, "B")
    } else if mag >= 1_000_000 {
        (mag as f64 / 1e6, "M")
    } else if mag >= 1_000 {
        (mag as f64 / 1e3, "K")
    } else {
        return score.to_string();
    };
    format!("{sign}{value:.1}{unit}")
}

/// Build the list excerpt: markup stripped, entities decoded, cut to the
/// first `max_words` whitespace-delimited words with a trailing "..." only
/// when something was actually cut. Already-short plain text passes through
/// unchanged.
pub fn excerpt(raw: &str, max_words: usize) -> String {
    let text = decode_entities(&strip_markup(raw));
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.trim().to_string();
    }
    let mut out = words[..max_words].join(" ");
    out.push_str("...");
    out
}

/// Strip HTML tags plus the markdown decorations that would read as noise in
/// a one-line excerpt: images vanish, links keep their label, emphasis
/// asterisks and backticks go away, and heading/quote/list markers are
/// dropped at line starts.
pub fn strip_markup(raw: &str) -> String {
    let text = strip_tags(raw);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut at_line_start = true;
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                out.push('\n');
                at_line_start = true;
                continue;
            }
            '`' | '*' => {}
            '#' | '>' if at_line_start => {
                // swallow the full marker run ("## ", "> ")
                while matches!(chars.peek(), Some('#') | Some('>') | Some(' ')) {
                    chars.next();
                }
                continue;
            }
            '-' | '+' if at_line_start && chars.peek() == Some(&' ') => {
                chars.next();
                continue;
            }
            '!' if chars.peek() == Some(&'[') => {
                chars.next();
                skip_link_label(&mut chars, None);
                skip_link_target(&mut chars);
            }
            '[' => {
                skip_link_label(&mut chars, Some(&mut out));
                skip_link_target(&mut chars);
            }
            _ => out.push(c),
        }
        if !c.is_whitespace() {
            at_line_start = false;
        }
    }
    out
}

/// Consume chars up to the closing `]`. With `keep`, the label text is
/// emitted (link labels survive, image alt text does not).
fn skip_link_label(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, keep: Option<&mut String>) {
    let mut label = String::new();
    for c in chars.by_ref() {
        if c == ']' {
            break;
        }
        label.push(c);
    }
    if let Some(out) = keep {
        out.push_str(&label);
    }
}

/// Consume a `(target)` group if one directly follows the label.
fn skip_link_target(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    if chars.peek() == Some(&'(') {
        for c in chars.by_ref() {
            if c == ')' {
                break;
            }
        }
    }
}

/// Remove HTML tags, translating the structural ones into line breaks so the
/// text keeps its shape: `<br>` becomes a newline, closing block tags become
/// a paragraph break. A lone `<` that does not open a tag stays literal.
pub fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];
        let looks_like_tag = rest[1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
            .unwrap_or(false);
        let close = if looks_like_tag { rest.find('>') } else { None };
        match close {
            Some(end) => {
                let inner = &rest[1..end];
                let closing = inner.starts_with('/');
                let name: String = inner
                    .trim_start_matches('/')
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                match name.as_str() {
                    "br" => out.push('\n'),
                    "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" if closing => {
                        out.push_str("\n\n")
                    }
                    _ => {}
                }
                rest = &rest[end + 1..];
            }
            None => {
                out.push('<');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode the HTML entities that actually show up in Hive bodies: the named
/// common set plus decimal/hex numeric references. Unknown entities pass
/// through verbatim.
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let mut semi = None;
        for (i, &b) in rest.as_bytes().iter().enumerate().skip(1).take(31) {
            match b {
                b';' => {
                    semi = Some(i);
                    break;
                }
                b'#' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' => {}
                _ => break,
            }
        }
        match semi.and_then(|i| decode_entity(&rest[1..i]).map(|c| (i, c))) {
            Some((i, decoded)) => {
                out.push(decoded);
                rest = &rest[i + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "hellip" => Some('…'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "lsquo" => Some('‘'),
        "rsquo" => Some('’'),
        "ldquo" => Some('“'),
        "rdquo" => Some('”'),
        _ => {
            let code = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .and_then(|h| u32::from_str_radix(h, 16).ok())
                .or_else(|| name.strip_prefix('#').and_then(|d| d.parse().ok()))?;
            char::from_u32(code)
        }
    }
}

/// The reading-view pipeline: markup reduced to text first, then entities
/// decoded, Windows line endings normalized, paragraphs split on blank
/// lines. Single newlines inside a paragraph are kept as soft breaks.
/// Stripping before decoding keeps author-escaped text (`&lt;angle&gt;`)
/// readable while real tags never reach the output.
pub fn body_paragraphs(raw: &str) -> Vec<String> {
    let text = decode_entities(&strip_tags(raw)).replace("\r\n", "\n");
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_short_text_is_unchanged() {
        let body = "just a handful of plain words";
        assert_eq!(excerpt(body, 30), body);
    }

    #[test]
    fn excerpt_truncates_to_word_limit_with_ellipsis() {
        let body = "word ".repeat(50);
        let cut = excerpt(&body, 30);
        assert_eq!(cut, format!("{}...", vec!["word"; 30].join(" ")));
    }

    #[test]
    fn excerpt_exactly_at_limit_gets_no_ellipsis() {
        let body = vec!["w"; 30].join(" ");
        assert_eq!(excerpt(&body, 30), body);
    }

    #[test]
    fn strip_markup_handles_links_and_images() {
        let body = "see [the docs](https://example.com) and ![pic](https://example.com/a.png) here";
        assert_eq!(strip_markup(body), "see the docs and  here");
    }

    #[test]
    fn strip_markup_drops_heading_and_emphasis_markers() {
        assert_eq!(strip_markup("## Title\n**bold** text"), "Title\nbold text");
    }

    #[test]
    fn strip_tags_keeps_inner_text_and_comparison_operators() {
        assert_eq!(strip_tags("<b>bold</b> and 2 < 3"), "bold and 2 < 3");
        assert_eq!(strip_tags("a<br>b"), "a\nb");
    }

    #[test]
    fn decode_entities_named_and_numeric() {
        assert_eq!(decode_entities("a &amp; b &lt;tag&gt; &#39;q&#39;"), "a & b <tag> 'q'");
        assert_eq!(decode_entities("&#x41;&#66;"), "AB");
        assert_eq!(decode_entities("fish &chips"), "fish &chips");
    }

    #[test]
    fn body_paragraphs_split_on_blank_lines() {
        let body = "first para\nstill first\n\nsecond para\r\n\r\nthird";
        assert_eq!(body_paragraphs(body), vec!["first para\nstill first", "second para", "third"]);
    }

    #[test]
    fn body_paragraphs_keep_escaped_tags_as_text() {
        let body = "before&nbsp;after\n\n&lt;notag&gt; <em>emphasis</em>";
        assert_eq!(body_paragraphs(body), vec!["before after", "<notag> emphasis"]);
    }

    #[test]
    fn payout_prefix_parse() {
        assert_eq!(parse_amount_prefix("1.234 HBD"), 1.234);
        assert_eq!(parse_amount_prefix("0.000 HBD"), 0.0);
        assert_eq!(parse_amount_prefix("garbage"), 0.0);
    }

    #[test]
    fn score_formatting_is_compact_and_signed() {
        assert_eq!(format_score(123), "123");
        assert_eq!(format_score(-7), "-7");
        assert_eq!(format_score(45_600), "45.6K");
        assert_eq!(format_score(1_230_000_000_000), "1.2T");
        assert_eq!(format_score(-2_500_000), "-2.5M");
    }

    #[test]
    fn created_parse_and_formats() {
        let dt = parse_created("2024-01-02T15:04:05").unwrap();
        assert_eq!(format_date(&dt), "02/01/2024");
        assert_eq!(format_datetime(&dt), "02/01/2024 15:04");
    }
}
