use crate::engine::pptx::PptxAutomizer;
use crate::slideshow::{self, GenerationResult};
use serde_json::{Value, json};

pub fn call(args: &Value) -> Value {
    let result = slideshow::generate::<PptxAutomizer>(args);
    tool_result(&result)
}

fn tool_result(result: &GenerationResult) -> Value {
    let text = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.message.clone());
    json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": result,
        "isError": !result.success
    })
}
