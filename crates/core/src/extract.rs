//! Ordered-rule text extraction for electrical project descriptions.
//!
//! Every classifier here is a ranked rule table: the first rule that matches
//! wins and later rules are never consulted, so table order is part of the
//! contract. A description mentioning both "factory" and "upgrade" is a
//! renovation, because the renovation row outranks the industrial row.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback when a description carries no recognizable duration.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

const MAX_SPEC_LEN: usize = 100;
const MAX_SPECS: usize = 10;

/// Project type keyword table. More specific categories come first.
const PROJECT_TYPES: &[(&str, &[&str])] = &[
    ("new_construction", &["new build", "new construction", "ground up", "new development"]),
    ("renovation", &["remodel", "renovation", "upgrade", "retrofit", "modernization"]),
    ("industrial", &["factory", "warehouse", "plant", "industrial", "manufacturing"]),
    ("commercial", &["office", "retail", "store", "shop", "commercial", "business"]),
    ("institutional", &["school", "hospital", "church", "government", "institutional"]),
    ("residential", &["home", "house", "apartment", "condo", "residential"]),
];

/// Voltage patterns, most specific first (`480V three phase` must beat `480V`).
static VOLTAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        r"(?i)\d{2,3}[vV]\s*(?:three|3)\s*phase",
        r"(?i)\d{2,3}[vV]\s*(?:single|1)\s*phase",
        r"(?i)\d{2,3}\s*[vV]",
        r"(?i)\d{2,3}/\d{2,3}",
        r"(?i)\d+\s*phase",
        r"(?i)single\s*phase",
        r"(?i)three\s*phase",
    ])
});

static SQUARE_FOOTAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        // With thousands separators: 12,500 square feet. Anchored so the
        // group cannot start mid-digit-run on plain figures like 5000.
        r"(?i)\b(\d{1,3}(?:,\d{3})*)\s*(?:sq\.?|square)\s*(?:ft|feet|foot)",
        // Plain: 5000 sq ft
        r"(?i)(\d{1,6})\s*(?:sq\.?|square)\s*(?:ft|feet|foot)",
        // Abbreviated: 1500sf
        r"(?i)(\d{1,6})\s*(?:sf|sqft)",
    ])
});

static SPEC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        r"(?i)install\s+(\d+)\s+([^,.\n]+)",
        r"(?i)upgrade\s+([^,.\n]+)",
        r"(?i)replace\s+([^,.\n]+)",
        r"(?i)add\s+(\d+)?\s*([^,.\n]+)",
        r"(?i)new\s+([^,.\n]+)",
        r"(?i)(\d+)\s*amp\s+([^,.\n]+)",
        r"(?i)lighting\s+([^,.\n]+)",
        r"(?i)panel\s+([^,.\n]+)",
        r"(?i)outlet[s]?\s+([^,.\n]+)",
        r"(?i)circuit[s]?\s+([^,.\n]+)",
    ])
});

static WEEKS_RE: Lazy<Regex> = Lazy::new(|| compile(r"(\d+)\s*weeks?"));
static MONTHS_RE: Lazy<Regex> = Lazy::new(|| compile(r"(\d+)\s*months?"));
static DAYS_RE: Lazy<Regex> = Lazy::new(|| compile(r"(\d+)\s*days?"));

static DURATION_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)(?:take|last|duration|about)\s+(?:about\s+)?(\d+\s*(?:weeks?|months?|days?))")
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("extraction patterns are static and must compile")
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|pattern| compile(pattern)).collect()
}

/// Classify a free-text description into a project type label.
/// Falls back to `general` when nothing in the table matches.
pub fn project_type(text: &str) -> &'static str {
    let lowered = text.to_lowercase();

    for (label, keywords) in PROJECT_TYPES {
        if keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return label;
        }
    }

    "general"
}

/// Pull a voltage specification out of free text, e.g. `480V three phase`.
pub fn voltage_requirements(text: &str) -> Option<String> {
    VOLTAGE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|matched| matched.as_str().to_string())
}

/// Extract a square footage figure, tolerating thousands separators.
pub fn square_footage(text: &str) -> Option<u32> {
    for pattern in SQUARE_FOOTAGE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let digits = captures[1].replace(',', "");
            if let Ok(value) = digits.parse() {
                return Some(value);
            }
        }
    }
    None
}

/// Convert a duration phrase into days. Weeks are 7 days and months are a
/// flat 30 days; this is an estimating heuristic, not calendar math.
pub fn parse_duration_days(duration_text: &str) -> u32 {
    let lowered = duration_text.to_lowercase();

    if let Some(captures) = WEEKS_RE.captures(&lowered) {
        if let Ok(weeks) = captures[1].parse::<u32>() {
            return weeks * 7;
        }
    }
    if let Some(captures) = MONTHS_RE.captures(&lowered) {
        if let Ok(months) = captures[1].parse::<u32>() {
            return months * 30;
        }
    }
    if let Some(captures) = DAYS_RE.captures(&lowered) {
        if let Ok(days) = captures[1].parse::<u32>() {
            return days;
        }
    }

    DEFAULT_DURATION_DAYS
}

/// Find a duration phrase buried in a longer description, e.g.
/// "should take about 2 months" yields "2 months".
pub fn duration_hint(text: &str) -> Option<String> {
    DURATION_HINT_RE.captures(text).map(|captures| captures[1].to_string())
}

/// Extract work-specification snippets ("install 20 outlets", "400 amp
/// panel", ...). Results are truncated to 100 characters, deduplicated
/// case-insensitively in first-seen order, and capped at 10.
pub fn specifications(text: &str) -> Vec<String> {
    let mut specs = Vec::new();

    for pattern in SPEC_PATTERNS.iter() {
        for captures in pattern.captures_iter(text) {
            let spec = captures
                .iter()
                .skip(1)
                .flatten()
                .map(|group| group.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();

            // Very short fragments are noise.
            if spec.len() > 3 {
                specs.push(truncate_chars(&spec, MAX_SPEC_LEN));
            }
        }
    }

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for spec in specs {
        if seen.insert(spec.to_lowercase()) {
            unique.push(spec);
        }
        if unique.len() == MAX_SPECS {
            break;
        }
    }

    unique
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
