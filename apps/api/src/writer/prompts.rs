// Resume Writer prompt templates.

pub const TAILORING_SYSTEM: &str = "\
You are an expert Resume Writer and Career Strategist. \
You rewrite resume content to target a specific job while staying strictly truthful.";

/// Replace: {no_fabrication}, {job_description}, {gap_report}, {resume},
///          {headings_instruction}, {output_format}
pub const TAILORING_PROMPT_TEMPLATE: &str = r#"Rewrite the "Professional Summary" and "Skills" sections of the candidate's resume to target the job description below.

GUIDELINES:
1. Use the gap analysis to address weaknesses.
2. Work the job description's keywords in where the resume supports them (e.g. if they want Redshift, lean on "Cloud Data Warehousing" or SQL proficiency).
3. {no_fabrication}
4. Keep it professional, action-oriented and confident.

--- JOB DESCRIPTION ---
{job_description}

--- GAP ANALYSIS FEEDBACK ---
{gap_report}

--- ORIGINAL RESUME CONTENT ---
{resume}

OUTPUT FORMAT (markdown):
{headings_instruction}

{output_format}"#;
