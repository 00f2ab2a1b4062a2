//! Section isolation and entry splitting.
//!
//! A section starts at a line opening with one of its header keywords and runs
//! until a line opens with a keyword of a *different* section.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::patterns::{self, LEADING_DATE_RE};
use crate::models::cv::{EducationEntry, ExperienceEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Education,
    Experience,
    Abilities,
}

impl SectionKind {
    const ALL: [SectionKind; 3] = [
        SectionKind::Education,
        SectionKind::Experience,
        SectionKind::Abilities,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            SectionKind::Education => &["education"],
            SectionKind::Experience => &["experience", "employment", "work history"],
            SectionKind::Abilities => &["skills", "abilities", "competencies", "proficiencies"],
        }
    }

    /// Word that marks a leftover header fragment.
    fn leftover_marker(self) -> &'static str {
        match self {
            SectionKind::Education => "education",
            SectionKind::Experience => "experience",
            SectionKind::Abilities => "skills",
        }
    }
}

/// Classifies a line by the header keyword it opens with, if any.
///
/// Only the line start counts: `"Education Experience"` is an education header.
/// The keyword must end at a word boundary, so `"Experienced ..."` is not a header.
/// Returns the kind and the byte length of the header (leading blanks + keyword).
pub fn header_at_line_start(line: &str) -> Option<(SectionKind, usize)> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();
    let lowered = trimmed.to_lowercase();
    SectionKind::ALL.into_iter().find_map(|kind| {
        kind.keywords().iter().find_map(|kw| {
            let rest = lowered.strip_prefix(kw)?;
            let at_boundary = rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
            // Lowercasing can change byte lengths; only trust ASCII-aligned prefixes.
            let aligned = trimmed.is_char_boundary(kw.len())
                && trimmed[..kw.len()].eq_ignore_ascii_case(kw);
            (at_boundary && aligned).then_some((kind, indent + kw.len()))
        })
    })
}

/// The raw text of one section: its header line followed by its body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
}

impl Section {
    /// Section lines with the header keyword (and an optional colon) removed
    /// from the first line. Same-kind header lines with nothing after them are dropped.
    fn content_lines(&self) -> Vec<&str> {
        self.text
            .lines()
            .filter_map(|line| match header_at_line_start(line) {
                Some((kind, len)) if kind == self.kind => {
                    let rest = line[len..].trim_start();
                    let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
                    (!rest.is_empty()).then_some(rest)
                }
                _ => Some(line),
            })
            .collect()
    }
}

/// Locates the first header of `kind`. `None` means the section is absent.
pub fn find_section(text: &str, kind: SectionKind) -> Option<Section> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| matches!(header_at_line_start(line), Some((k, _)) if k == kind))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| matches!(header_at_line_start(line), Some((k, _)) if k != kind))
        .map_or(lines.len(), |offset| start + 1 + offset);
    Some(Section {
        kind,
        text: lines[start..end].join("\n"),
    })
}

// ── Entry splitting ─────────────────────────────────────────────────────────

/// Identifying slots a line can fill inside one entry.
#[derive(Debug, Clone, Copy, Default)]
struct Slots {
    date: bool,
    primary: bool,
    secondary: bool,
}

impl Slots {
    fn any(self) -> bool {
        self.date || self.primary || self.secondary
    }

    fn overlaps(self, other: Slots) -> bool {
        (self.date && other.date)
            || (self.primary && other.primary)
            || (self.secondary && other.secondary)
    }

    fn union(self, other: Slots) -> Slots {
        Slots {
            date: self.date || other.date,
            primary: self.primary || other.primary,
            secondary: self.secondary || other.secondary,
        }
    }
}

static INSTITUTION_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:university|college|school|institute)\b").unwrap());

static LEADING_DEGREE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[ \t]*(?:bachelor|master|phd|ph\.d|diploma|doctorate|certificate|mba)").unwrap()
});

static LEADING_EMPLOYER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ \t]*(?:company|employer)\b").unwrap());

static LEADING_ROLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[ \t]*(?:position|job title)\b").unwrap());

fn education_slots(line: &str) -> Slots {
    Slots {
        date: LEADING_DATE_RE.is_match(line),
        primary: INSTITUTION_KEYWORD_RE.is_match(line),
        secondary: LEADING_DEGREE_RE.is_match(line),
    }
}

fn experience_slots(line: &str) -> Slots {
    Slots {
        date: LEADING_DATE_RE.is_match(line),
        primary: LEADING_EMPLOYER_RE.is_match(line),
        secondary: LEADING_ROLE_RE.is_match(line),
    }
}

/// Splits section lines into entry fragments.
///
/// Lines that open with a date or an entry keyword are split candidates. A
/// candidate only opens a new fragment when the current fragment already holds
/// the slot it would fill, so `Institution / Degree / Dates` stays one entry.
/// When a fragment opened with plain lines (e.g. a name above its dates), the
/// same number of trailing plain lines moves to the next fragment with the split.
fn split_fragments(lines: &[&str], slots_of: fn(&str) -> Slots) -> Vec<String> {
    let mut fragments: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut filled = Slots::default();
    let mut lead = 0usize;
    let mut trailing_plain = 0usize;

    for &line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let slots = slots_of(line);
        if slots.any() && filled.overlaps(slots) {
            let carry = lead.min(trailing_plain).min(current.len());
            let carried = current.split_off(current.len() - carry);
            fragments.push(std::mem::take(&mut current));
            current = carried;
            filled = Slots::default();
            lead = carry;
        }
        if slots.any() {
            trailing_plain = 0;
        } else {
            if !filled.any() {
                lead += 1;
            }
            trailing_plain += 1;
        }
        filled = filled.union(slots);
        current.push(line);
    }
    fragments.push(current);

    fragments
        .into_iter()
        .map(|lines| lines.join("\n").trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

fn is_header_leftover(fragment: &str, kind: SectionKind) -> bool {
    fragment.chars().count() < 15 && fragment.to_lowercase().contains(kind.leftover_marker())
}

fn education_entry(fragment: &str) -> Option<EducationEntry> {
    let dates = patterns::date_range(fragment);
    let entry = EducationEntry {
        institution: patterns::institution(fragment),
        degree: patterns::degree(fragment),
        field_of_study: patterns::field_of_study(fragment),
        start_date: dates.start,
        end_date: dates.end,
        description: patterns::description(fragment),
    };
    let identified = !entry.institution.is_empty()
        || !entry.degree.is_empty()
        || !entry.field_of_study.is_empty();
    identified.then_some(entry)
}

fn experience_entry(fragment: &str) -> Option<ExperienceEntry> {
    let dates = patterns::date_range(fragment);
    let entry = ExperienceEntry {
        company: patterns::company(fragment),
        position: patterns::position(fragment),
        start_date: dates.start,
        end_date: dates.end,
        description: patterns::description(fragment),
    };
    let identified = !entry.company.is_empty() || !entry.position.is_empty();
    identified.then_some(entry)
}

/// Education entries in document order. Empty when the section is absent.
pub fn education_entries(text: &str) -> Vec<EducationEntry> {
    let Some(section) = find_section(text, SectionKind::Education) else {
        return Vec::new();
    };
    split_fragments(&section.content_lines(), education_slots)
        .iter()
        .filter(|fragment| !is_header_leftover(fragment, SectionKind::Education))
        .filter_map(|fragment| education_entry(fragment))
        .collect()
}

/// Experience entries in document order. Empty when the section is absent.
pub fn experience_entries(text: &str) -> Vec<ExperienceEntry> {
    let Some(section) = find_section(text, SectionKind::Experience) else {
        return Vec::new();
    };
    split_fragments(&section.content_lines(), experience_slots)
        .iter()
        .filter(|fragment| !is_header_leftover(fragment, SectionKind::Experience))
        .filter_map(|fragment| experience_entry(fragment))
        .collect()
}

// ── Abilities ───────────────────────────────────────────────────────────────

static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[•*\-][ \t]*([^\n•]+)").unwrap());

static LIST_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\n]").unwrap());

/// Bulleted lines win; otherwise the section body is read as a delimited list.
pub fn abilities(text: &str) -> Vec<String> {
    let Some(section) = find_section(text, SectionKind::Abilities) else {
        return Vec::new();
    };

    let bullets: Vec<String> = BULLET_RE
        .captures_iter(&section.text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if !bullets.is_empty() {
        return bullets;
    }

    let body = section.content_lines().join("\n");
    LIST_SEPARATOR_RE
        .split(&body)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
