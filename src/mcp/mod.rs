use serde_json::json;

pub mod contracts;
pub mod errors;

pub fn tool_definitions() -> Vec<serde_json::Value> {
    vec![json!({
        "name": contracts::TOOL_GENERATE_SLIDESHOW,
        "description": "Generate a PowerPoint presentation from templates, appending selected slides \
                        with {{tag}} text replacements and image replacements.",
        "inputSchema": contracts::generate_slideshow_schema()
    })]
}
