//! Runs one pipeline from the command line and prints the result.
//!
//! Usage: run_pipeline --resume resume.pdf --job-description jd.txt --company "Acme" [--json]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orchestrator::config::Config;
use orchestrator::extraction::UploadedDocument;
use orchestrator::pipeline::{Pipeline, PipelineReport, PipelineRequest};

#[derive(Debug, Parser)]
#[command(name = "run_pipeline", about = "Tailor a resume to a job and company")]
struct Cli {
    /// Resume file (PDF, TXT or MD)
    #[arg(long)]
    resume: PathBuf,

    /// File containing the job description
    #[arg(long)]
    job_description: PathBuf,

    /// Company to research
    #[arg(long)]
    company: String,

    /// Print the full report as JSON instead of markdown
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr so stdout stays clean for the report.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("orchestrator={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let resume = tokio::fs::read(&cli.resume)
        .await
        .with_context(|| format!("failed to read resume {}", cli.resume.display()))?;
    let job_description = tokio::fs::read_to_string(&cli.job_description)
        .await
        .with_context(|| {
            format!(
                "failed to read job description {}",
                cli.job_description.display()
            )
        })?;

    let file_name = cli
        .resume
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let pipeline = Pipeline::from_config(&config)?;
    let report = pipeline
        .run(PipelineRequest {
            document: UploadedDocument::new(file_name, resume),
            job_description,
            company_name: cli.company,
        })
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_markdown(&report));
    }
    Ok(())
}

fn render_markdown(report: &PipelineReport) -> String {
    let mut out = format!(
        "# {}\n\n## Company Research\n\n{}\n\n",
        report.company_name, report.research_summary
    );
    out.push_str(&format!("## Gap Analysis\n\n{}\n\n", report.gap_report));
    out.push_str(&format!("## Tailored Content\n\n{}\n", report.tailored_content));
    if !report.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for warning in &report.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }
    out
}
