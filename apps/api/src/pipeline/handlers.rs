use std::convert::Infallible;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::UploadedDocument;
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::models::{PipelineReport, PipelineRequest};
use crate::state::AppState;

/// POST /api/v1/pipeline
/// Multipart fields: `resume` (file), `job_description`, `company_name`.
pub async fn handle_run_pipeline(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PipelineReport>, AppError> {
    let request = read_request(multipart).await?;
    let report = state.pipeline.run(request).await?;
    Ok(Json(report))
}

/// POST /api/v1/pipeline/stream
/// Same fields as `/api/v1/pipeline`. Invalid input is rejected before the stream
/// opens; after that, progress, intermediate results and the final report or
/// error arrive as server-sent events.
pub async fn handle_stream_pipeline(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let request = read_request(multipart).await?;
    request.validate()?;

    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let last = match pipeline.run_observed(request, Some(tx.clone())).await {
            Ok(report) => PipelineEvent::Completed {
                report: Box::new(report),
            },
            Err(e) => {
                let (_, code, message) = AppError::from(e).public_parts();
                PipelineEvent::Failed { code, message }
            }
        };
        let _ = tx.send(last);
    });

    // Ends once the run task drops its sender.
    let stream = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let json = serde_json::to_string(&event).unwrap_or_default();
        Some((
            Ok::<_, Infallible>(Event::default().event(event.name()).data(json)),
            rx,
        ))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn read_request(mut multipart: Multipart) -> Result<PipelineRequest, AppError> {
    let mut request = PipelineRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                request.document = UploadedDocument::new(file_name, bytes);
            }
            "job_description" => {
                request.job_description = field.text().await.map_err(multipart_error)?;
            }
            "company_name" => {
                request.company_name = field.text().await.map_err(multipart_error)?;
            }
            _ => {}
        }
    }

    info!(
        "Pipeline requested for {:?} ({} byte upload)",
        request.company_name.trim(),
        request.document.bytes.len()
    );
    Ok(request)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Invalid form data: {}", e.body_text()))
    }
}
