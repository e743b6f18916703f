use super::plan::SlidePlan;
use super::request::GenerationRequest;
use crate::engine::{CompositionEngine, EngineConfig, WriteSummary};
use crate::error::GenerateError;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub output_path: PathBuf,
    pub summary: WriteSummary,
    pub duration: Duration,
}

/// Drives one engine instance through the request. Steps run strictly in
/// order and the first failure abandons the rest.
pub fn compose<E: CompositionEngine>(
    request: &GenerationRequest,
) -> Result<Composition, GenerateError> {
    let started = Instant::now();

    let mut engine = E::create(EngineConfig {
        template_dir: request.template_dir.clone(),
        output_dir: request.output_dir.clone(),
        media_dir: request.media_dir.clone(),
        remove_existing_slides: request.remove_existing_slides,
    })?;

    engine.load_root(&request.root_template)?;

    for template in &request.templates {
        engine.load(&template.filename, &template.label)?;
    }

    if let Some(media_files) = &request.media_files {
        engine.load_media(media_files)?;
    }

    for (index, slide) in request.slides.iter().enumerate() {
        let plan = SlidePlan::from_spec(slide);
        debug!(
            index,
            template = plan.template(),
            slide_number = plan.slide_number(),
            modifications = plan.modifications().len(),
            "appending slide"
        );
        engine.append_slide(plan.template(), plan.slide_number(), &plan)?;
    }

    let summary = engine.write(&request.output_filename)?;
    let output_path = request.output_dir.join(&request.output_filename);
    info!(
        output = %output_path.display(),
        slides = summary.slides,
        images = summary.images,
        "slideshow composed"
    );

    Ok(Composition {
        output_path,
        summary,
        duration: started.elapsed(),
    })
}
