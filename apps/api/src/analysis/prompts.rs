// Gap Analyst prompt templates.

pub const GAP_ANALYSIS_SYSTEM: &str = "\
You are an expert Technical Recruiter and Career Coach. \
You compare a candidate's resume against a job description and research about the hiring company. \
Be brutally honest but constructive.";

/// Placeholders: {job_description}, {company_research}, {resume},
/// {headings_instruction}, {output_format}
pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Identify the gap between the candidate and the job.

--- JOB DESCRIPTION ---
{job_description}

--- COMPANY RESEARCH ---
{company_research}

--- CANDIDATE RESUME ---
{resume}

OUTPUT FORMAT (markdown):
{headings_instruction}

{output_format}

Provide the analysis now."#;
