//! Orchestrator — runs the four stages strictly in order.
//!
//! Flow: validate → stage upload → extract → research → analyze → write → report.
//! Watchers get each transition and intermediate result as it happens.
//!
//! Any stage failure aborts the run; no partial results are returned. The staged
//! upload is owned by the run and removed on every exit path.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::{GapAnalysisRequest, GapAnalyst, LlmGapAnalyst};
use crate::config::Config;
use crate::extraction::{DocumentExtractor, FileExtractor, StagedUpload};
use crate::llm_client::{LlmClient, LlmError, TextGenerator};
use crate::pipeline::error::PipelineError;
use crate::pipeline::events::{EventSender, PipelineEvent};
use crate::pipeline::models::{PipelineReport, PipelineRequest};
use crate::pipeline::state::{PipelineRun, PipelineState};
use crate::research::{CompanyResearcher, ReactResearchAgent, ResearchRequest};
use crate::search::SerperClient;
use crate::writer::{LlmResumeWriter, ResumeWriter, TailoringRequest};

/// The four stage capabilities plus where uploads are staged.
pub struct Pipeline {
    extractor: Arc<dyn DocumentExtractor>,
    researcher: Arc<dyn CompanyResearcher>,
    analyst: Arc<dyn GapAnalyst>,
    writer: Arc<dyn ResumeWriter>,
    upload_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        researcher: Arc<dyn CompanyResearcher>,
        analyst: Arc<dyn GapAnalyst>,
        writer: Arc<dyn ResumeWriter>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            extractor,
            researcher,
            analyst,
            writer,
            upload_dir,
        }
    }

    /// Wires the production stages: pdf-extract, ReAct agent over Serper, and the
    /// chat-completions client shared by research, analysis and writing.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let llm: Arc<dyn TextGenerator> = Arc::new(LlmClient::new(config)?);
        let search = Arc::new(SerperClient::new(config));

        Ok(Self::new(
            Arc::new(FileExtractor),
            Arc::new(ReactResearchAgent::new(
                llm.clone(),
                search,
                config.research_temperature,
                config.agent_max_iterations,
            )),
            Arc::new(LlmGapAnalyst::new(llm.clone(), config.analyst_temperature)),
            Arc::new(LlmResumeWriter::new(llm, config.writer_temperature)),
            config.upload_dir.clone(),
        ))
    }

    /// Runs the whole pipeline for one request, blocking the caller until it finishes.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineReport, PipelineError> {
        self.run_observed(request, None).await
    }

    /// Like `run`, but publishes every transition and each intermediate result
    /// to `events` as soon as it is available.
    pub async fn run_observed(
        &self,
        request: PipelineRequest,
        events: Option<EventSender>,
    ) -> Result<PipelineReport, PipelineError> {
        let mut run = PipelineRun::new(Uuid::new_v4());
        if let Some(events) = events {
            run = run.with_events(events);
        }

        // Validation failure keeps the run in Idle; nothing external is touched.
        if let Err(e) = request.validate() {
            warn!("Pipeline run {} rejected: {e}", run.run_id());
            return Err(e);
        }

        match self.execute(&mut run, &request).await {
            Ok(report) => Ok(report),
            Err(e) => {
                let failed_in = run.state();
                run.fail();
                error!(
                    "Pipeline run {} failed while {}: {e} [{}]",
                    run.run_id(),
                    failed_in,
                    e.code()
                );
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        run: &mut PipelineRun,
        request: &PipelineRequest,
    ) -> Result<PipelineReport, PipelineError> {
        let started_at = Utc::now();
        let company_name = request.company_name.trim();

        run.advance();
        let staged = StagedUpload::stage_blocking(
            self.upload_dir.clone(),
            run.run_id(),
            request.document.clone(),
        )
        .await
        .map_err(PipelineError::Staging)?;
        let resume = self.extractor.extract(staged.path()).await?;
        info!(
            "Run {}: extracted {} chars from {:?}",
            run.run_id(),
            resume.as_str().len(),
            request.document.file_name
        );

        run.advance();
        let research = self
            .researcher
            .research(ResearchRequest {
                company_name: company_name.to_string(),
            })
            .await?;
        run.emit(PipelineEvent::Research {
            summary: research.summary.clone(),
            queries: research.queries.clone(),
        });

        run.advance();
        let gap_report = self
            .analyst
            .analyze(GapAnalysisRequest {
                resume_text: resume.as_str(),
                job_description: &request.job_description,
                company_research: &research.summary,
            })
            .await
            .map_err(PipelineError::generation(PipelineState::Analyzing))?;

        let gap_check = gap_report.check();
        if !gap_check.is_well_formed() {
            warn!("Run {}: gap report is malformed: {:?}", run.run_id(), gap_check);
        }
        let mut warnings = gap_check.warnings("Gap report");
        run.emit(PipelineEvent::GapReport {
            markdown: gap_report.markdown.clone(),
        });

        run.advance();
        let tailored = self
            .writer
            .tailor(TailoringRequest {
                resume_text: resume.as_str(),
                job_description: &request.job_description,
                gap_report: &gap_report.markdown,
            })
            .await
            .map_err(PipelineError::generation(PipelineState::Writing))?;
        warnings.extend(tailored.check().warnings("Tailored content"));

        run.advance();
        drop(staged);

        Ok(PipelineReport {
            run_id: run.run_id(),
            company_name: company_name.to_string(),
            research_summary: research.summary,
            search_queries: research.queries,
            gap_overview: gap_report.overview(),
            gap_report: gap_report.markdown,
            tailored_content: tailored.markdown,
            warnings,
            transitions: run.history().to_vec(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::analysis::GapReport;
    use crate::extraction::{ExtractionError, ResumeText, UploadedDocument};
    use crate::research::{AgentError, CompanyResearch};
    use crate::writer::TailoredContent;

    const GAP_REPORT: &str = "\
## Match Score
62/100

## Missing Keywords
- Redshift
- dbt

## Cultural Fit
Good alignment with Acme's data-driven culture.

## Suggested Improvements
1. Frame SQL work as Cloud Data Warehousing foundations.
2. Add a dbt side project.
3. Quantify pipeline impact.";

    const TAILORED: &str = "\
### Tailored Professional Summary
Data engineer with 5 years of Python and SQL, building toward Cloud Data Warehousing.

### Recommended Skills Updates
- Cloud Data Warehousing (SQL foundations)

### Weekend Project
Model a public dataset with dbt on a free warehouse tier.";

    /// Shared call log so tests can assert on stage order.
    type CallLog = Arc<Mutex<Vec<String>>>;

    struct RecordingExtractor {
        log: CallLog,
        seen_paths: Arc<Mutex<Vec<PathBuf>>>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentExtractor for RecordingExtractor {
        async fn extract(&self, path: &Path) -> Result<ResumeText, ExtractionError> {
            self.log.lock().unwrap().push("extract".to_string());
            self.seen_paths.lock().unwrap().push(path.to_path_buf());
            assert!(path.exists(), "staged upload must exist during extraction");
            if self.fail {
                return Err(ExtractionError::NoText);
            }
            let text = tokio::fs::read_to_string(path).await?;
            ResumeText::new(&text)
        }
    }

    struct StubResearcher {
        log: CallLog,
        fail: bool,
    }

    #[async_trait]
    impl CompanyResearcher for StubResearcher {
        async fn research(&self, request: ResearchRequest) -> Result<CompanyResearch, AgentError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("research:{}", request.company_name));
            if self.fail {
                return Err(AgentError::IterationLimit { iterations: 15 });
            }
            Ok(CompanyResearch {
                summary: "- Acme builds analytics software".to_string(),
                queries: vec!["Acme news".to_string()],
            })
        }
    }

    /// Returns the canned report, or echoes the resume text it was given when `echo_resume` is set.
    struct StubAnalyst {
        log: CallLog,
        fail: bool,
        echo_resume: bool,
    }

    #[async_trait]
    impl GapAnalyst for StubAnalyst {
        async fn analyze(&self, request: GapAnalysisRequest<'_>) -> Result<GapReport, LlmError> {
            self.log.lock().unwrap().push("analyze".to_string());
            if self.fail {
                return Err(LlmError::EmptyContent);
            }
            assert_eq!(request.company_research, "- Acme builds analytics software");
            let markdown = if self.echo_resume {
                request.resume_text.to_string()
            } else {
                GAP_REPORT.to_string()
            };
            Ok(GapReport { markdown })
        }
    }

    struct StubWriter {
        log: CallLog,
        seen_gap: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl ResumeWriter for StubWriter {
        async fn tailor(&self, request: TailoringRequest<'_>) -> Result<TailoredContent, LlmError> {
            self.log.lock().unwrap().push("write".to_string());
            *self.seen_gap.lock().unwrap() = Some(request.gap_report.to_string());
            Ok(TailoredContent {
                markdown: TAILORED.to_string(),
            })
        }
    }

    #[derive(Default, Clone, Copy)]
    struct Failures {
        extract: bool,
        research: bool,
        analyze: bool,
        echo_resume: bool,
    }

    struct Harness {
        pipeline: Pipeline,
        log: CallLog,
        seen_paths: Arc<Mutex<Vec<PathBuf>>>,
        seen_gap: Arc<Mutex<Option<String>>>,
        dir: tempfile::TempDir,
    }

    fn harness(failures: Failures) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let seen_paths = Arc::new(Mutex::new(Vec::new()));
        let seen_gap = Arc::new(Mutex::new(None));

        let pipeline = Pipeline::new(
            Arc::new(RecordingExtractor {
                log: log.clone(),
                seen_paths: seen_paths.clone(),
                fail: failures.extract,
            }),
            Arc::new(StubResearcher {
                log: log.clone(),
                fail: failures.research,
            }),
            Arc::new(StubAnalyst {
                log: log.clone(),
                fail: failures.analyze,
                echo_resume: failures.echo_resume,
            }),
            Arc::new(StubWriter {
                log: log.clone(),
                seen_gap: seen_gap.clone(),
            }),
            dir.path().to_path_buf(),
        );

        Harness {
            pipeline,
            log,
            seen_paths,
            seen_gap,
            dir,
        }
    }

    fn request(resume: &str) -> PipelineRequest {
        PipelineRequest {
            document: UploadedDocument::new("resume.txt", resume.to_string()),
            job_description: "Requires AWS Redshift, Python, dbt".to_string(),
            company_name: " Acme ".to_string(),
        }
    }

    fn calls(h: &Harness) -> Vec<String> {
        h.log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_stages_run_in_fixed_order() {
        let h = harness(Failures::default());
        let report = h.pipeline.run(request("5 years Python, SQL")).await.unwrap();

        assert_eq!(calls(&h), vec!["extract", "research:Acme", "analyze", "write"]);
        assert_eq!(
            report.transitions,
            vec![
                PipelineState::Idle,
                PipelineState::Extracting,
                PipelineState::Researching,
                PipelineState::Analyzing,
                PipelineState::Writing,
                PipelineState::Done,
            ]
        );
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_report_surfaces_intermediate_outputs() {
        let h = harness(Failures::default());
        let report = h.pipeline.run(request("5 years Python, SQL")).await.unwrap();

        assert_eq!(report.company_name, "Acme");
        assert_eq!(report.research_summary, "- Acme builds analytics software");
        assert_eq!(report.search_queries, vec!["Acme news"]);
        assert_eq!(report.gap_report, GAP_REPORT);
        assert_eq!(report.tailored_content, TAILORED);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[tokio::test]
    async fn test_gap_report_flows_into_writer() {
        let h = harness(Failures::default());
        let report = h.pipeline.run(request("5 years Python, SQL")).await.unwrap();

        assert_eq!(h.seen_gap.lock().unwrap().as_deref(), Some(GAP_REPORT));
        assert_eq!(report.gap_overview.match_score, Some(62));
        assert!(report.gap_overview.missing_keywords.contains(&"Redshift".to_string()));
        assert!(report.gap_overview.missing_keywords.contains(&"dbt".to_string()));
        assert!(report.tailored_content.contains("Cloud Data Warehousing"));
    }

    #[tokio::test]
    async fn test_validation_failure_attempts_no_stage() {
        for bad in [
            PipelineRequest {
                document: UploadedDocument::default(),
                ..request("x")
            },
            PipelineRequest {
                job_description: "  ".to_string(),
                ..request("x")
            },
            PipelineRequest {
                company_name: String::new(),
                ..request("x")
            },
        ] {
            let h = harness(Failures::default());
            let err = h.pipeline.run(bad).await.unwrap_err();
            assert!(matches!(err, PipelineError::Validation(_)));
            assert!(calls(&h).is_empty());
            assert!(h.seen_paths.lock().unwrap().is_empty());
        }
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_observed_run_reports_progress_and_research_early() {
        let h = harness(Failures::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        h.pipeline
            .run_observed(request("5 years Python, SQL"), Some(tx))
            .await
            .unwrap();

        let events = drain(&mut rx);
        let names: Vec<&str> = events.iter().map(PipelineEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "progress",
                "progress",
                "research",
                "progress",
                "gap_report",
                "progress",
                "progress"
            ]
        );

        let percents: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![20, 40, 70, 90, 100]);

        match &events[2] {
            PipelineEvent::Research { summary, .. } => {
                assert_eq!(summary, "- Acme builds analytics software")
            }
            other => panic!("expected research event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_observed_failure_ends_in_error_progress() {
        let h = harness(Failures {
            research: true,
            ..Default::default()
        });
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _ = h.pipeline.run_observed(request("5 years Python"), Some(tx)).await;

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.name() == "progress"));
        assert!(matches!(
            events.last(),
            Some(PipelineEvent::Progress {
                state: PipelineState::Error,
                percent: 0,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_staging_failure_is_not_an_extraction_failure() {
        let mut h = harness(Failures::default());
        h.pipeline.upload_dir = h.dir.path().join("missing");

        let err = h.pipeline.run(request("5 years Python")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Staging(_)));
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(calls(&h).is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_stops_before_research() {
        let h = harness(Failures {
            extract: true,
            ..Default::default()
        });
        let err = h.pipeline.run(request("unreadable")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Extraction(ExtractionError::NoText)));
        assert_eq!(calls(&h), vec!["extract"]);
    }

    #[tokio::test]
    async fn test_research_failure_stops_before_analysis() {
        let h = harness(Failures {
            research: true,
            ..Default::default()
        });
        let err = h.pipeline.run(request("5 years Python")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Agent(_)));
        assert_eq!(calls(&h), vec!["extract", "research:Acme"]);
    }

    #[tokio::test]
    async fn test_analysis_failure_stops_before_writing() {
        let h = harness(Failures {
            analyze: true,
            ..Default::default()
        });
        let err = h.pipeline.run(request("5 years Python")).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Generation {
                stage: PipelineState::Analyzing,
                ..
            }
        ));
        assert_eq!(calls(&h), vec!["extract", "research:Acme", "analyze"]);
    }

    #[tokio::test]
    async fn test_staged_upload_removed_on_success_and_failure() {
        for failures in [
            Failures::default(),
            Failures {
                extract: true,
                ..Default::default()
            },
            Failures {
                analyze: true,
                ..Default::default()
            },
        ] {
            let h = harness(failures);
            let _ = h.pipeline.run(request("5 years Python, SQL")).await;

            let paths = h.seen_paths.lock().unwrap().clone();
            assert_eq!(paths.len(), 1);
            assert!(!paths[0].exists(), "staged upload leaked: {}", paths[0].display());
            assert_eq!(std::fs::read_dir(h.dir.path()).unwrap().count(), 0);
        }
    }

    #[tokio::test]
    async fn test_malformed_gap_report_passes_through_with_warning() {
        let h = harness(Failures {
            echo_resume: true,
            ..Default::default()
        });
        let report = h.pipeline.run(request("5 years Python, SQL")).await.unwrap();

        assert_eq!(report.gap_report, "5 years Python, SQL");
        assert_eq!(
            h.seen_gap.lock().unwrap().as_deref(),
            Some("5 years Python, SQL")
        );
        assert!(report.warnings[0].starts_with("Gap report is missing sections"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_runs_do_not_share_uploads() {
        let h = Arc::new(harness(Failures {
            echo_resume: true,
            ..Default::default()
        }));

        let a = {
            let h = h.clone();
            tokio::spawn(async move { h.pipeline.run(request("Resume A: Rust, Kafka")).await })
        };
        let b = {
            let h = h.clone();
            tokio::spawn(async move { h.pipeline.run(request("Resume B: Go, Postgres")).await })
        };

        let report_a = a.await.unwrap().unwrap();
        let report_b = b.await.unwrap().unwrap();

        assert_eq!(report_a.gap_report, "Resume A: Rust, Kafka");
        assert_eq!(report_b.gap_report, "Resume B: Go, Postgres");
        assert_ne!(report_a.run_id, report_b.run_id);

        let paths = h.seen_paths.lock().unwrap().clone();
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
    }
}
