use crate::engine::TextStyle;
use crate::error::GenerateError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const REQUIRED_FIELDS: [&str; 5] = [
    "templateDir",
    "outputDir",
    "rootTemplate",
    "slides",
    "outputFilename",
];

/// A validated generation request. Built only by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub media_dir: PathBuf,
    pub root_template: String,
    pub templates: Vec<TemplateRef>,
    pub media_files: Option<Vec<String>>,
    pub slides: Vec<SlideSpec>,
    pub output_filename: String,
    pub remove_existing_slides: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateRef {
    pub filename: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSpec {
    pub template: String,
    #[serde(deserialize_with = "whole_number")]
    pub slide_number: u32,
    #[serde(default)]
    pub text_replacements: Option<Vec<TextReplacementGroup>>,
    #[serde(default)]
    pub image_replacements: Option<Vec<ImageReplacement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextReplacementGroup {
    pub element: String,
    pub replacements: Vec<TagReplacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagReplacement {
    pub tag: String,
    pub text: String,
    #[serde(default)]
    pub style: Option<TextStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReplacement {
    pub element: String,
    pub media_file: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    template_dir: PathBuf,
    output_dir: PathBuf,
    #[serde(default)]
    media_dir: Option<String>,
    root_template: String,
    #[serde(default)]
    templates: Option<Vec<TemplateRef>>,
    #[serde(default)]
    media_files: Option<Vec<String>>,
    slides: Vec<SlideSpec>,
    output_filename: String,
    #[serde(default)]
    remove_existing_slides: Option<bool>,
}

/// Checks the raw tool arguments and prepares the output directory.
///
/// Required fields are checked before anything touches the filesystem, and
/// the output directory is only created once every other check has passed.
pub fn validate(args: &Value) -> Result<GenerationRequest, GenerateError> {
    let obj = args
        .as_object()
        .ok_or_else(|| GenerateError::InvalidInput("arguments must be an object".to_string()))?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| is_falsy(obj.get(*field)))
        .collect();
    if !missing.is_empty() {
        return Err(GenerateError::MissingField(missing));
    }

    let raw: RawRequest = serde_json::from_value(args.clone())
        .map_err(|err| GenerateError::InvalidInput(format!("invalid request: {err}")))?;

    if raw.slides.is_empty() {
        return Err(GenerateError::InvalidInput(
            "slides must not be empty".to_string(),
        ));
    }
    if let Some(index) = raw.slides.iter().position(|slide| slide.slide_number == 0) {
        return Err(GenerateError::InvalidInput(format!(
            "slides[{index}].slideNumber must be 1 or greater"
        )));
    }

    if !raw.template_dir.exists() {
        return Err(GenerateError::TemplateDirNotFound(raw.template_dir));
    }

    if !raw.output_dir.exists() {
        fs::create_dir_all(&raw.output_dir).map_err(|source| GenerateError::Filesystem {
            path: raw.output_dir.clone(),
            source,
        })?;
        debug!(output_dir = %raw.output_dir.display(), "created output directory");
    }

    let media_dir = raw
        .media_dir
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| raw.template_dir.clone());

    Ok(GenerationRequest {
        template_dir: raw.template_dir,
        output_dir: raw.output_dir,
        media_dir,
        root_template: raw.root_template,
        templates: raw.templates.unwrap_or_default(),
        media_files: raw.media_files,
        slides: raw.slides,
        output_filename: raw.output_filename,
        remove_existing_slides: raw.remove_existing_slides != Some(false),
    })
}

/// JSON numbers such as `2.0` are accepted as long as they are whole.
fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!(
            "slideNumber must be a whole number, got {value}"
        )));
    }
    Ok(value as u32)
}

fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}
