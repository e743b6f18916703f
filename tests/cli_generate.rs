mod common;

use common::{read_slides, text_shape, write_presentation};
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn cli_generate_writes_presentation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("out");
    write_presentation(&dir.path().join("Root.pptx"), &[text_shape("title", "{{title}}")])?;

    let config = serde_json::json!({
        "templateDir": dir.path().to_string_lossy(),
        "outputDir": output.to_string_lossy(),
        "rootTemplate": "Root.pptx",
        "slides": [{
            "template": "Root.pptx",
            "slideNumber": 1,
            "textReplacements": [{
                "element": "title",
                "replacements": [{"tag": "title", "text": "Quarterly Review"}]
            }]
        }],
        "outputFilename": "cli.pptx"
    });
    let config_path = dir.path().join("request.json");
    fs::write(&config_path, serde_json::to_string(&config)?)?;

    let result = Command::new(env!("CARGO_BIN_EXE_mcp-pptx"))
        .args([
            "generate",
            "--config",
            config_path.to_string_lossy().as_ref(),
        ])
        .output()?;

    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout)?;
    assert!(stdout.contains("Slideshow generated successfully. Output: "));

    let (_, xml) = read_slides(&output.join("cli.pptx"))?;
    assert!(xml.contains("Quarterly Review"));
    Ok(())
}

#[test]
fn cli_generate_json_reports_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config_path = dir.path().join("request.json");
    let config = serde_json::json!({
        "templateDir": dir.path().join("missing").to_string_lossy(),
        "outputDir": dir.path().join("out").to_string_lossy(),
        "rootTemplate": "Root.pptx",
        "slides": [{"template": "Root.pptx", "slideNumber": 1}],
        "outputFilename": "cli.pptx"
    });
    fs::write(&config_path, serde_json::to_string(&config)?)?;

    let result = Command::new(env!("CARGO_BIN_EXE_mcp-pptx"))
        .args([
            "generate",
            "--config",
            config_path.to_string_lossy().as_ref(),
            "--json",
        ])
        .output()?;

    assert!(!result.status.success());
    let structured: serde_json::Value = serde_json::from_slice(&result.stdout)?;
    assert_eq!(structured["success"], serde_json::json!(false));
    let message = structured["message"].as_str().expect("message present");
    assert!(message.contains("Template directory does not exist"));
    Ok(())
}
