//! Slideshow generation pipeline: validate the tool arguments, plan each
//! slide, drive a [`CompositionEngine`], and report the outcome.

use crate::engine::CompositionEngine;
use serde_json::Value;

pub mod orchestrator;
pub mod plan;
pub mod replacement;
pub mod request;
pub mod response;

pub use response::GenerationResult;

/// Runs one request end to end. Every failure comes back as an unsuccessful
/// [`GenerationResult`].
pub fn generate<E: CompositionEngine>(args: &Value) -> GenerationResult {
    let outcome = request::validate(args).and_then(|request| orchestrator::compose::<E>(&request));
    response::package(outcome)
}
