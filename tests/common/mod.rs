#![allow(dead_code)]

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{ChildStdin, ChildStdout};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.presentationml";

pub fn send_request(
    stdin: &mut ChildStdin,
    stdout: &mut BufReader<ChildStdout>,
    request: serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let serialized = serde_json::to_string(&request)?;
    writeln!(stdin, "{serialized}")?;
    stdin.flush()?;

    let mut line = String::new();
    stdout.read_line(&mut line)?;
    let response: serde_json::Value = serde_json::from_str(line.trim())?;
    Ok(response)
}

pub fn text_shape(name: &str, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

pub fn picture_shape(name: &str, rel_id: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="{name}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/></p:blipFill><p:spPr/></p:pic>"#
    )
}

/// Writes a one-layout presentation with one slide per shape markup entry,
/// each carrying an `rId2` image relationship.
pub fn write_presentation(path: &Path, slides: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut overrides = format!(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="{CT_BASE}.presentation.main+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{CT_BASE}.slideLayout+xml"/>"#
    );
    let mut slide_ids = String::new();
    let mut presentation_rels = String::new();
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();

    for (index, shapes) in slides.iter().enumerate() {
        let number = index + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="{CT_BASE}.slide+xml"/>"#
        ));
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{number}"/>"#,
            255 + number
        ));
        presentation_rels.push_str(&format!(
            r#"<Relationship Id="rId{number}" Type="{REL_BASE}/slide" Target="slides/slide{number}.xml"/>"#
        ));
        parts.push((
            format!("ppt/slides/slide{number}.xml"),
            format!(r#"<p:sld {NAMESPACES}><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#)
                .into_bytes(),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{number}.xml.rels"),
            relationships(&format!(
                r#"<Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_BASE}/image" Target="../media/image1.png"/>"#
            ))
            .into_bytes(),
        ));
    }

    parts.push((
        "[Content_Types].xml".to_string(),
        format!(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{overrides}</Types>"#
        )
        .into_bytes(),
    ));
    parts.push((
        "_rels/.rels".to_string(),
        relationships(&format!(
            r#"<Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/>"#
        ))
        .into_bytes(),
    ));
    parts.push((
        "ppt/presentation.xml".to_string(),
        format!(
            r#"<p:presentation {NAMESPACES}><p:sldMasterIdLst/><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
        )
        .into_bytes(),
    ));
    parts.push((
        "ppt/_rels/presentation.xml.rels".to_string(),
        relationships(&presentation_rels).into_bytes(),
    ));
    parts.push((
        "ppt/slideLayouts/slideLayout1.xml".to_string(),
        format!(r#"<p:sldLayout {NAMESPACES}><p:cSld name="Title Slide"><p:spTree/></p:cSld></p:sldLayout>"#)
            .into_bytes(),
    ));
    parts.push(("ppt/media/image1.png".to_string(), b"\x89PNGold".to_vec()));

    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in parts {
        writer.start_file(name, options)?;
        writer.write_all(&bytes)?;
    }
    writer.finish()?;
    Ok(())
}

/// Part names and the concatenated slide XML of a generated presentation.
pub fn read_slides(path: &Path) -> Result<(Vec<String>, String), Box<dyn std::error::Error>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut slide_names: Vec<&String> = names
        .iter()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .collect();
    slide_names.sort();

    let mut xml = String::new();
    for name in slide_names {
        let mut entry = archive.by_name(name)?;
        entry.read_to_string(&mut xml)?;
    }
    Ok((names, xml))
}

fn relationships(body: &str) -> String {
    format!(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{body}</Relationships>"#
    )
}
