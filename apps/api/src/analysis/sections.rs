//! Section validation for sectioned model output (gap report, tailored content).
//!
//! Nothing here rejects output. Malformed reports are passed downstream unchanged;
//! the orchestrator records what this layer finds as warnings on the report.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// One expected section of a report: canonical heading, accepted variants, and the
/// instruction text shown to the model under the heading.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub hint: &'static str,
}

pub const GAP_REPORT_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        name: "Match Score",
        aliases: &[],
        hint: "A single score out of 100, e.g. 72/100, with one sentence of justification",
    },
    SectionSpec {
        name: "Missing Keywords",
        aliases: &[],
        hint: "Bullet list of specific tools and skills the job description asks for \
               that the resume lacks",
    },
    SectionSpec {
        name: "Cultural Fit",
        aliases: &[],
        hint: "How well the resume matches the company's culture and mission based on the research",
    },
    SectionSpec {
        name: "Suggested Improvements",
        aliases: &["3 Specific Improvements", "Specific Improvements", "Improvements"],
        hint: "Exactly three concrete changes to the resume that would most improve \
               the odds of an interview",
    },
];

pub const TAILORED_CONTENT_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        name: "Tailored Professional Summary",
        aliases: &["Professional Summary"],
        hint: "The rewritten professional summary",
    },
    SectionSpec {
        name: "Recommended Skills Updates",
        aliases: &[
            "Recommended Skills Section Updates",
            "Skills Section Updates",
            "Skills Updates",
        ],
        hint: "List of skills to add or reword, grounded in the original resume",
    },
    SectionSpec {
        name: "Weekend Project",
        aliases: &["Strategic Project Idea", "Project Idea"],
        hint: "One small project the candidate could build this weekend to close the biggest gap",
    },
];

/// A located section and the text under it (up to the next recognised heading).
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: &'static str,
    pub body: String,
}

/// Structural findings for one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionCheck {
    pub missing: Vec<&'static str>,
    pub out_of_order: bool,
}

impl SectionCheck {
    pub fn is_well_formed(&self) -> bool {
        self.missing.is_empty() && !self.out_of_order
    }

    /// Human-readable warnings, prefixed with the report label.
    pub fn warnings(&self, label: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.missing.is_empty() {
            warnings.push(format!(
                "{label} is missing sections: {}",
                self.missing.join(", ")
            ));
        }
        if self.out_of_order {
            warnings.push(format!("{label} sections are out of order"));
        }
        warnings
    }
}

/// Facts pulled out of a gap report for display alongside the markdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapOverview {
    pub match_score: Option<u32>,
    pub missing_keywords: Vec<String>,
}

fn numbered_heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]\s").expect("numbered heading regex is valid"))
}

fn score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,3})\b").expect("score regex is valid"))
}

fn list_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("list regex is valid"))
}

/// Strips markdown decoration, numbering, emoji and quotes, leaving the words a
/// heading would start with. Case is preserved.
fn strip_decoration(line: &str) -> String {
    let stripped: String = line
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '_' | '"' | '`'))
        .collect();
    stripped
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(|c: char| !c.is_alphabetic())
        .trim()
        .to_string()
}

/// Returns the matching section index and whatever follows the heading on the same line.
fn match_heading(line: &str, specs: &[SectionSpec]) -> Option<(usize, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let decorated = trimmed.starts_with('#')
        || trimmed.starts_with("**")
        || numbered_heading_regex().is_match(trimmed);
    let plain = strip_decoration(trimmed);
    let normalized = plain.to_lowercase();

    for (index, spec) in specs.iter().enumerate() {
        let names = std::iter::once(spec.name).chain(spec.aliases.iter().copied());
        for name in names {
            let name = name.to_lowercase();
            let Some(rest) = normalized.strip_prefix(&name) else {
                continue;
            };
            let rest = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
            if decorated || rest.is_empty() {
                return Some((index, inline_body(&plain, name.chars().count())));
            }
        }
    }
    None
}

/// Text after the first `heading_chars` characters of `plain`, in its original case.
fn inline_body(plain: &str, heading_chars: usize) -> String {
    let tail = plain
        .char_indices()
        .nth(heading_chars)
        .map(|(at, _)| &plain[at..])
        .unwrap_or_default();
    tail.trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .trim()
        .to_string()
}

/// Splits a report into its recognised sections, in the order they appear.
/// Only the first occurrence of each heading opens a section.
pub fn split_sections(text: &str, specs: &[SectionSpec]) -> Vec<Section> {
    let mut sections: Vec<(usize, Vec<String>)> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        if let Some((index, rest)) = match_heading(line, specs) {
            // A repeated heading is body text of the section being read.
            if !sections.iter().any(|(seen, _)| *seen == index) {
                let mut body = Vec::new();
                if !rest.is_empty() {
                    body.push(rest);
                }
                sections.push((index, body));
                current = Some(sections.len() - 1);
                continue;
            }
        }
        if let Some(position) = current {
            sections[position].1.push(line.to_string());
        }
    }

    sections
        .into_iter()
        .map(|(index, body)| Section {
            name: specs[index].name,
            body: body.join("\n").trim().to_string(),
        })
        .collect()
}

/// Reports missing and out-of-order sections.
pub fn check_sections(text: &str, specs: &[SectionSpec]) -> SectionCheck {
    let found = split_sections(text, specs);
    let order: Vec<usize> = found
        .iter()
        .filter_map(|s| specs.iter().position(|spec| spec.name == s.name))
        .collect();

    SectionCheck {
        missing: specs
            .iter()
            .filter(|spec| !found.iter().any(|s| s.name == spec.name))
            .map(|spec| spec.name)
            .collect(),
        out_of_order: order.windows(2).any(|w| w[0] > w[1]),
    }
}

/// Extracts the match score and missing-keyword list from a gap report.
pub fn gap_overview(text: &str) -> GapOverview {
    let sections = split_sections(text, GAP_REPORT_SECTIONS);

    let match_score = score_regex()
        .captures_iter(section_body(&sections, "Match Score"))
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|score| *score <= 100);

    GapOverview {
        match_score,
        missing_keywords: keyword_list(section_body(&sections, "Missing Keywords")),
    }
}

fn section_body<'a>(sections: &'a [Section], name: &str) -> &'a str {
    sections
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.body.as_str())
        .unwrap_or_default()
}

/// Reads a keyword list written either as bullets or as one comma-separated line.
fn keyword_list(body: &str) -> Vec<String> {
    let bullets: Vec<&str> = body
        .lines()
        .filter(|l| list_marker_regex().is_match(l))
        .collect();

    let raw: Vec<String> = if bullets.is_empty() {
        body.split([',', ';', '\n']).map(str::to_string).collect()
    } else {
        bullets
            .iter()
            .map(|l| list_marker_regex().replace(l, "").into_owned())
            .collect()
    };

    raw.iter()
        .map(|item| clean_keyword(item))
        .filter(|k| !k.is_empty())
        .collect()
}

/// Keeps the keyword itself: drops emphasis and any trailing explanation.
fn clean_keyword(item: &str) -> String {
    let plain: String = item.chars().filter(|c| !matches!(c, '*' | '`')).collect();
    let cut = [":", " (", " - ", " – "]
        .iter()
        .filter_map(|sep| plain.find(sep))
        .min()
        .unwrap_or(plain.len());
    plain[..cut].trim().trim_end_matches('.').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED_GAP: &str = "\
## Match Score
68/100 - strong Python and SQL, no warehouse tooling.

## Missing Keywords
- **Redshift**: the core warehouse
- dbt (transformations)
- AWS

## Cultural Fit
Acme values ownership; the resume shows initiative.

## Suggested Improvements
1. Add a warehousing project.
2. Quantify SQL impact.
3. Mention cloud exposure.";

    #[test]
    fn test_well_formed_gap_report_passes() {
        let check = check_sections(WELL_FORMED_GAP, GAP_REPORT_SECTIONS);
        assert!(check.is_well_formed(), "{check:?}");
        assert!(check.warnings("Gap report").is_empty());
    }

    #[test]
    fn test_numbered_bold_headings_recognised() {
        let text = "\
1. **Match Score**: 85/100
2. **Missing Keywords**: Redshift, dbt
3. **Cultural Fit**: good
4. **3 Specific Improvements**:
- one
- two
- three";
        let sections = split_sections(text, GAP_REPORT_SECTIONS);
        let names: Vec<_> = sections.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["Match Score", "Missing Keywords", "Cultural Fit", "Suggested Improvements"]
        );
        assert_eq!(sections[0].body, "85/100");
        assert!(sections[3].body.contains("- three"));
    }

    #[test]
    fn test_emoji_headings_recognised() {
        let text = "\
### 🎯 Tailored Professional Summary
Data engineer with 5 years of Python and SQL.

### 🛠 Recommended Skills Section Updates
- Cloud Data Warehousing (SQL foundations)

### 🚀 Strategic \"Project\" Idea
Build a dbt model over a public dataset.";
        let check = check_sections(text, TAILORED_CONTENT_SECTIONS);
        assert!(check.is_well_formed(), "{check:?}");
    }

    #[test]
    fn test_missing_sections_reported() {
        let text = "## Match Score\n50/100\n\n## Cultural Fit\nfine";
        let check = check_sections(text, GAP_REPORT_SECTIONS);
        assert_eq!(check.missing, vec!["Missing Keywords", "Suggested Improvements"]);
        assert!(!check.out_of_order);
        assert_eq!(
            check.warnings("Gap report"),
            vec!["Gap report is missing sections: Missing Keywords, Suggested Improvements"]
        );
    }

    #[test]
    fn test_out_of_order_reported() {
        let text = "\
## Cultural Fit
ok
## Match Score
70
## Missing Keywords
- dbt
## Suggested Improvements
- x";
        let check = check_sections(text, GAP_REPORT_SECTIONS);
        assert!(check.missing.is_empty());
        assert!(check.out_of_order);
    }

    #[test]
    fn test_prose_mention_is_not_a_heading() {
        let text = "## Cultural Fit\nThe missing keywords section below is short.";
        let sections = split_sections(text, GAP_REPORT_SECTIONS);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].body.contains("missing keywords section"));
    }

    #[test]
    fn test_gap_overview_extracts_score_and_keywords() {
        let overview = gap_overview(WELL_FORMED_GAP);
        assert_eq!(overview.match_score, Some(68));
        assert_eq!(overview.missing_keywords, vec!["Redshift", "dbt", "AWS"]);
    }

    #[test]
    fn test_gap_overview_reads_inline_keyword_list() {
        let text = "\
1. **Match Score**: 85/100
2. **Missing Keywords**: Redshift, dbt.
3. **Cultural Fit**: good";
        let overview = gap_overview(text);
        assert_eq!(overview.match_score, Some(85));
        assert_eq!(overview.missing_keywords, vec!["Redshift", "dbt"]);
    }

    #[test]
    fn test_inline_heading_body_keeps_original_case() {
        let sections = split_sections(
            "2. **Missing Keywords**: `AWS Redshift`, dbt",
            GAP_REPORT_SECTIONS,
        );
        assert_eq!(sections[0].name, "Missing Keywords");
        assert_eq!(sections[0].body, "AWS Redshift, dbt");
    }

    #[test]
    fn test_repeated_heading_stays_in_current_section() {
        let text = "\
## Cultural Fit
Strong ownership culture.

## Suggested Improvements
1. Lead with the pipeline migration.
2. Cultural fit: mention the mentoring program.
3. Add a dbt project.";
        let sections = split_sections(text, GAP_REPORT_SECTIONS);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "Strong ownership culture.");
        assert!(sections[1].body.contains("2. Cultural fit: mention the mentoring program."));
        assert!(sections[1].body.ends_with("3. Add a dbt project."));
    }

    #[test]
    fn test_gap_overview_ignores_out_of_range_numbers() {
        let text = "## Match Score\nAbout 450 applicants; you score 40 out of 100.";
        assert_eq!(gap_overview(text).match_score, Some(40));
    }

    #[test]
    fn test_gap_overview_of_malformed_report_is_empty() {
        assert_eq!(gap_overview("Looks good overall!"), GapOverview::default());
    }
}
