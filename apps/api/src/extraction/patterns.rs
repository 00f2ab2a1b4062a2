//! Field extractors over raw CV text.
//!
//! Every extractor is total: no match yields `""` (or an empty [`DateRange`]).
//! Each field has an ordered table of candidate patterns; the first pattern that
//! yields a non-empty capture wins, so the table order is the tie-break policy.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::sections::header_at_line_start;

const DEGREE_KEYWORDS: &str =
    r"(?:bachelor(?:'s|s)?|master(?:'s|s)?|phd|doctorate|diploma|certificate|mba|bs|ba|ms|ma)";
const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";
const YEAR: &str = r"(?:19|20)\d{2}";
const RANGE_SEP: &str = r"[ \t]*(?:-|–|—|\bto\b)[ \t]*";
const OPEN_END: &str = r"(?:present|current|now)";

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Returns the first non-empty capture group 1 across `patterns`, in table order.
fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    first_capture_where(patterns, text, |_| true)
}

/// Like [`first_capture`], skipping captures that fail `accept`.
fn first_capture_where(
    patterns: &[Regex],
    text: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures_iter(text).find_map(|caps| {
            caps.get(1)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty() && accept(s))
                .map(str::to_string)
        })
    })
}

fn has_letter(s: &str) -> bool {
    s.chars().any(char::is_alphabetic)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ── Personal info ───────────────────────────────────────────────────────────

static NAME_LABEL_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?i)\bname:[ \t]*(\w[\w \t]*)".to_string()]));

static NAME_LINE_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"(?m)^[ \t]*(\w[\w \t]*?)[ \t]*$".to_string()]));

static NAME_BANNER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?im)^[ \t]*([^\n]+?)[ \t]*\n[ \t]*curriculum vitae".to_string(),
        r"(?im)^[ \t]*([^\n]+?)[ \t]*\n[ \t]*r[eé]sum[eé]".to_string(),
    ])
});

/// Full name: labelled name, a word-only line above the first section header,
/// the line above a "curriculum vitae" / "resume" banner, then the first line
/// if it looks like one.
pub fn full_name(text: &str) -> String {
    let found = first_capture_where(&NAME_LABEL_PATTERNS, text, is_name_like)
        .or_else(|| first_capture_where(&NAME_LINE_PATTERNS, header_block(text), is_name_like))
        .or_else(|| first_capture_where(&NAME_BANNER_PATTERNS, text, is_name_like));
    if let Some(name) = found {
        return name;
    }

    let first_line = text.trim().lines().next().unwrap_or("").trim();
    if first_line.chars().count() < 50
        && is_name_like(first_line)
        && !first_line.contains('@')
        && !first_line.to_lowercase().contains("resume")
    {
        return first_line.to_string();
    }
    String::new()
}

fn is_name_like(candidate: &str) -> bool {
    has_letter(candidate) && !is_banner(candidate) && header_at_line_start(candidate).is_none()
}

/// The lines before the first section header.
fn header_block(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if header_at_line_start(line).is_some() {
            return &text[..offset];
        }
        offset += line.len();
    }
    text
}

fn is_banner(line: &str) -> bool {
    let line = line.to_lowercase();
    line == "curriculum vitae" || line.starts_with("resume") || line.starts_with("résumé")
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,6}").unwrap());

/// First e-mail address by text position.
pub fn email(text: &str) -> String {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

static PHONE_LABEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)phone:[ \t]*([\d \t+\-()]+)".to_string(),
        r"(?i)\btel:[ \t]*([\d \t+\-()]+)".to_string(),
        r"(?i)\bmobile:[ \t]*([\d \t+\-()]+)".to_string(),
    ])
});

static BARE_PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-. \t]?)?\(?\d{3}\)?[-. \t]?\d{3}[-. \t]?\d{4}").unwrap()
});

/// Labelled numbers return the captured digits; the bare 3-3-4 scan returns its whole match.
pub fn phone(text: &str) -> String {
    first_capture_where(&PHONE_LABEL_PATTERNS, text, |s| s.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| bare_phone(text))
        .unwrap_or_default()
}

/// The bare pattern must not touch a word character on either side.
fn bare_phone(text: &str) -> Option<String> {
    let mut start = 0;
    while start <= text.len() {
        let m = BARE_PHONE_RE.find_at(text, start)?;
        let clear_before = text[..m.start()]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let clear_after = text[m.end()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if clear_before && clear_after {
            return Some(m.as_str().to_string());
        }
        start = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

static ADDRESS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\baddress:[ \t]*([^\n]+)".to_string(),
        r"(?i)\blocation:[ \t]*([^\n]+)".to_string(),
    ])
});

pub fn address(text: &str) -> String {
    first_capture(&ADDRESS_PATTERNS, text).unwrap_or_default()
}

static SUMMARY_LABELS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bsummary\b:?".to_string(),
        r"(?i)\bobjective\b:?".to_string(),
        r"(?i)\bprofile\b:?".to_string(),
    ])
});

/// Everything after the first summary/objective/profile label, up to the next
/// line that opens a recognised section.
pub fn summary(text: &str) -> String {
    SUMMARY_LABELS
        .iter()
        .find_map(|label| {
            let m = label.find(text)?;
            let mut lines = text[m.end()..].lines();
            let mut body = vec![lines.next().unwrap_or("")];
            body.extend(lines.take_while(|line| header_at_line_start(line).is_none()));
            let body = body.join("\n").trim().to_string();
            (!body.is_empty()).then_some(body)
        })
        .unwrap_or_default()
}

// ── Education ───────────────────────────────────────────────────────────────

static INSTITUTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(?:institution|school|university):[ \t]*([^\n]+)".to_string(),
        r"(?i)\b((?:university|college|school|institute)[ \t]+of[ \t]+\w[\w \t]*)".to_string(),
        r"(?i)(\w[\w \t.&'-]*?[ \t]+(?:university|college|school|institute))\b".to_string(),
    ])
});

static DEGREE_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b{DEGREE_KEYWORDS}\b")).unwrap());

/// Institution by label or by `<kind> of <name>` / `<name> <kind>`.
/// Falls back to a short first line that carries no degree, date or label.
pub fn institution(text: &str) -> String {
    if let Some(found) = first_capture(&INSTITUTION_PATTERNS, text) {
        return found;
    }
    let first_line = text.trim().lines().next().unwrap_or("").trim();
    let plausible = first_line.chars().count() < 50
        && has_letter(first_line)
        && !DEGREE_KEYWORD_RE.is_match(first_line)
        && !YEAR_RE.is_match(first_line)
        && !is_label_line(first_line);
    if plausible {
        first_line.to_string()
    } else {
        String::new()
    }
}

static DEGREE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bdegree:[ \t]*([^\n]+)".to_string(),
        format!(
            r"(?i)\b({DEGREE_KEYWORDS}\b(?:[ \t]+degree)?(?:[ \t]+(?:of|in)[ \t]+\w[\w \t]*)?)"
        ),
        r"(?i)\b(b\.s\.|b\.a\.|m\.s\.|m\.a\.|m\.b\.a\.|ph\.d\.?)".to_string(),
    ])
});

pub fn degree(text: &str) -> String {
    first_capture(&DEGREE_PATTERNS, text).unwrap_or_default()
}

static FIELD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(?:field of study|field|major):[ \t]*([^\n,]+)".to_string(),
        format!(r"(?im)^[^\n]*\b{DEGREE_KEYWORDS}\b[^\n]*?\bin[ \t]+(\p{{L}}[^,\n]*)"),
        format!(r"(?i)\b{DEGREE_KEYWORDS}\b[ \t]+of[ \t]+(\p{{L}}[^,\n]*)"),
    ])
});

/// Text after "in" (preferred) or "of" on a degree line, up to a comma or newline.
pub fn field_of_study(text: &str) -> String {
    first_capture(&FIELD_PATTERNS, text).unwrap_or_default()
}

// ── Experience ──────────────────────────────────────────────────────────────

static COMPANY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bcompany:[ \t]*([^\n]+)".to_string(),
        r"(?i)\bemployer:[ \t]*([^\n]+)".to_string(),
        r"\b(?:[Aa]t|[Ff]or)[ \t]+(\p{Lu}[^\n,(|]*)".to_string(),
    ])
});

/// Company by label or `at`/`for <Name>`; else a short first line that is not a
/// position line and is more than a date range.
pub fn company(text: &str) -> String {
    if let Some(found) = first_capture(&COMPANY_PATTERNS, text) {
        return found;
    }
    let first_line = text.trim().lines().next().unwrap_or("").trim();
    let undated = strip_date_ranges(first_line);
    let undated = undated.trim();
    let plausible = first_line.chars().count() < 50
        && !first_line.to_lowercase().contains("position")
        && !is_label_line(first_line)
        && has_letter(undated);
    if plausible {
        undated.to_string()
    } else {
        String::new()
    }
}

static POSITION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\bposition:[ \t]*([^\n]+)".to_string(),
        r"(?i)\btitle:[ \t]*([^\n]+)".to_string(),
        r"(?i)\bjob title:[ \t]*([^\n]+)".to_string(),
        r"(?m)^[ \t]*(\p{L}[^\n:]*?)[ \t]+(?:at|@)[ \t]+\p{Lu}".to_string(),
    ])
});

pub fn position(text: &str) -> String {
    first_capture(&POSITION_PATTERNS, text).unwrap_or_default()
}

// ── Dates ───────────────────────────────────────────────────────────────────

/// Free-form start/end pair. An open-ended range keeps its marker ("present").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Year ranges capture an optional leading month so that `Month YYYY - ...`
/// is left to the month patterns.
static YEAR_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(\b{MONTH}[ \t]+)?\b({YEAR}){RANGE_SEP}({YEAR}|{OPEN_END})\b"
    ))
    .unwrap()
});

static MONTH_RANGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        format!(r"(?i)\b({MONTH}[ \t]+{YEAR}){RANGE_SEP}({MONTH}[ \t]+{YEAR})\b"),
        format!(r"(?i)\b({MONTH}[ \t]+{YEAR}){RANGE_SEP}({OPEN_END})\b"),
        format!(r"(?i)\b({MONTH}[ \t]+{YEAR}){RANGE_SEP}({YEAR})\b"),
    ])
});

static SINGLE_DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        format!(r"(?i)\b({MONTH}[ \t]+{YEAR})\b"),
        format!(r"\b({YEAR})\b"),
    ])
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"\b{YEAR}\b")).unwrap());

/// A line that opens with a date token (a year or a month followed by a year).
pub(crate) static LEADING_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^[ \t]*(?:{YEAR}\b|{MONTH}[ \t]+{YEAR}\b)")).unwrap()
});

/// Ranges are tried first, in table order; a lone date becomes the start only.
pub fn date_range(text: &str) -> DateRange {
    let year_range = YEAR_RANGE_RE
        .captures_iter(text)
        .find(|caps| caps.get(1).is_none())
        .map(|caps| DateRange {
            start: caps[2].to_string(),
            end: caps[3].to_string(),
        });
    if let Some(range) = year_range {
        return range;
    }
    let month_range = MONTH_RANGE_PATTERNS.iter().find_map(|re| {
        re.captures(text).map(|caps| DateRange {
            start: caps[1].trim().to_string(),
            end: caps[2].trim().to_string(),
        })
    });
    if let Some(range) = month_range {
        return range;
    }
    DateRange {
        start: first_capture(&SINGLE_DATE_PATTERNS, text).unwrap_or_default(),
        end: String::new(),
    }
}

fn strip_date_ranges(text: &str) -> String {
    // Month forms first so a year-only pass cannot leave orphaned month names.
    let text = MONTH_RANGE_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());
    YEAR_RANGE_RE.replace_all(&text, "").into_owned()
}

// ── Description ─────────────────────────────────────────────────────────────

static LABEL_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(?:company|employer|position|job title|title|institution|school|university|degree|field of study|field|major|dates?|period)[ \t]*:",
    )
    .unwrap()
});

fn is_label_line(line: &str) -> bool {
    LABEL_LINE_RE.is_match(line)
}

/// What is left of an entry once field-label lines and date ranges are removed.
pub fn description(text: &str) -> String {
    text.lines()
        .filter(|line| !is_label_line(line))
        .map(|line| strip_date_ranges(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
