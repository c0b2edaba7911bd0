// Shared prompt fragments.
// Each stage that calls the model defines its own prompts.rs alongside it.
// This file contains the cross-cutting pieces.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Instruction that keeps rewrites grounded in the original resume.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent experience, employers, titles, certifications or tools \
    that are not present in the original resume. \
    When the job asks for something the candidate lacks, reframe an existing skill \
    as transferable or foundational instead of claiming direct experience.";

/// Instruction that pins the markdown heading layout a stage must follow.
pub const HEADINGS_INSTRUCTION: &str = "\
    Use the section headings EXACTLY as written below, in the same order, \
    each on its own line. Do not add, rename or skip sections.";

/// Renders the heading list for a sectioned report, one markdown heading per line.
pub fn heading_outline(level: &str, sections: &[(&str, &str)]) -> String {
    sections
        .iter()
        .map(|(heading, hint)| format!("{level} {heading}\n({hint})"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"))
}

/// Fills `{name}` placeholders in one pass. Substituted values are inserted verbatim,
/// so braces inside user or model text are never expanded. Unknown placeholders are
/// left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
