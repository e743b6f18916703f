//! Document composition engine interface.
//!
//! The slideshow pipeline only talks to an engine through [`CompositionEngine`];
//! per-slide edits reach the engine as a [`SlideModifier`] that is handed a
//! [`SlideHandle`] while the slide is being appended.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod pptx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub media_dir: PathBuf,
    pub remove_existing_slides: bool,
}

/// Opening and closing markers wrapped around a tag inside slide text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delimiters {
    pub opening_tag: &'static str,
    pub closing_tag: &'static str,
}

impl Delimiters {
    pub fn wrap(&self, tag: &str) -> String {
        format!("{}{tag}{}", self.opening_tag, self.closing_tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColor {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Run formatting applied to replacement text. `size` is in hundredths of a point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInstruction {
    pub replace: String,
    pub by: ReplacementText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modification {
    ReplaceText {
        replacements: Vec<TextInstruction>,
        delimiters: Delimiters,
    },
    SetRelationTarget {
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub slides: usize,
    pub images: usize,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("root template has not been loaded")]
    RootNotLoaded,
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    #[error("slide {slide_number} not found in template {template}")]
    SlideNotFound { template: String, slide_number: u32 },
    #[error("element '{element}' not found on slide {slide_number} of {template}")]
    ElementNotFound {
        template: String,
        slide_number: u32,
        element: String,
    },
    #[error("element '{element}' cannot be modified: {reason}")]
    InvalidElement { element: String, reason: String },
    #[error("unsupported color type: {0}")]
    UnsupportedColor(String),
    #[error("media file not found: {0}")]
    MediaNotFound(String),
    #[error("media file was not loaded: {0}")]
    MediaNotLoaded(String),
    #[error("malformed part {part}: {message}")]
    Malformed { part: String, message: String },
    #[error("failed to parse {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: pptx::xml::XmlError,
    },
    #[error("failed to read package {path}: {source}")]
    Package {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Mutable view of a slide while it is being appended.
pub trait SlideHandle {
    fn modify_element(
        &mut self,
        element: &str,
        modification: &Modification,
    ) -> Result<(), EngineError>;
}

/// Callback run by the engine against each appended slide.
pub trait SlideModifier {
    fn apply(&self, slide: &mut dyn SlideHandle) -> Result<(), EngineError>;
}

pub trait CompositionEngine: Sized {
    fn create(config: EngineConfig) -> Result<Self, EngineError>;

    /// Loads the base document. Existing slides are dropped when the engine
    /// was created with `remove_existing_slides`.
    fn load_root(&mut self, filename: &str) -> Result<(), EngineError>;

    /// Registers a source template whose slides are addressable by `label`.
    fn load(&mut self, filename: &str, label: &str) -> Result<(), EngineError>;

    fn load_media(&mut self, filenames: &[String]) -> Result<(), EngineError>;

    fn append_slide(
        &mut self,
        template: &str,
        slide_number: u32,
        modifier: &dyn SlideModifier,
    ) -> Result<(), EngineError>;

    fn write(&mut self, filename: &str) -> Result<WriteSummary, EngineError>;
}
