use super::orchestrator::Composition;
use crate::error::GenerateError;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<GenerationSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub slides: usize,
    pub images: usize,
    pub duration_ms: u64,
}

pub fn package(outcome: Result<Composition, GenerateError>) -> GenerationResult {
    match outcome {
        Ok(composition) => {
            let output_path = composition.output_path.display().to_string();
            GenerationResult {
                success: true,
                message: format!("Slideshow generated successfully. Output: {output_path}"),
                output_path: Some(output_path),
                summary: Some(GenerationSummary {
                    slides: composition.summary.slides,
                    images: composition.summary.images,
                    duration_ms: u64::try_from(composition.duration.as_millis())
                        .unwrap_or(u64::MAX),
                }),
            }
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "slideshow generation failed");
            let message = if err.is_validation() {
                err.to_string()
            } else {
                format!("Error generating slideshow: {err}")
            };
            GenerationResult {
                success: false,
                message,
                output_path: None,
                summary: None,
            }
        }
    }
}
