use super::package::{Package, extension, relative_target};
use super::parts::{ContentTypes, Relationships};
use super::xml::{Element, Node};
use crate::engine::{
    Delimiters, EngineError, Modification, ReplacementText, SlideHandle, TextInstruction, TextStyle,
};
use std::collections::HashMap;
use tracing::debug;

const SHAPE_ELEMENTS: [&str; 5] = ["p:sp", "p:pic", "p:graphicFrame", "p:grpSp", "p:cxnSp"];
const COLOR_KINDS: [&str; 4] = ["srgbClr", "schemeClr", "prstClr", "sysClr"];

/// A slide being appended to the output presentation.
pub struct PptxSlide<'a> {
    pub template: &'a str,
    pub slide_number: u32,
    pub part: &'a str,
    pub xml: &'a mut Element,
    pub rels: &'a mut Relationships,
    pub package: &'a mut Package,
    pub content_types: &'a mut ContentTypes,
    pub media: &'a HashMap<String, Vec<u8>>,
}

impl SlideHandle for PptxSlide<'_> {
    fn modify_element(
        &mut self,
        element: &str,
        modification: &Modification,
    ) -> Result<(), EngineError> {
        let template = self.template;
        let slide_number = self.slide_number;
        let shape = self
            .xml
            .find_mut(&|candidate| shape_name(candidate).as_deref() == Some(element))
            .ok_or_else(|| EngineError::ElementNotFound {
                template: template.to_string(),
                slide_number,
                element: element.to_string(),
            })?;

        match modification {
            Modification::ReplaceText {
                replacements,
                delimiters,
            } => {
                let replaced = replace_text(shape, replacements, *delimiters)?;
                debug!(element, replaced, "replaced tags");
                Ok(())
            }
            Modification::SetRelationTarget { target } => {
                let rel_id = blip_relation(shape).ok_or_else(|| EngineError::InvalidElement {
                    element: element.to_string(),
                    reason: "no image relationship".to_string(),
                })?;
                let bytes = self
                    .media
                    .get(target)
                    .ok_or_else(|| EngineError::MediaNotLoaded(target.clone()))?;
                let media_part = add_media(self.package, self.content_types, target, bytes);
                let relative = relative_target(self.part, &media_part);
                let relationship =
                    self.rels
                        .get_mut(&rel_id)
                        .ok_or_else(|| EngineError::Malformed {
                            part: self.part.to_string(),
                            message: format!("relationship {rel_id} is missing"),
                        })?;
                relationship.target = relative;
                relationship.external = false;
                debug!(element, media = %media_part, "retargeted image");
                Ok(())
            }
        }
    }
}

fn shape_name(element: &Element) -> Option<String> {
    if !SHAPE_ELEMENTS.contains(&element.name.as_str()) {
        return None;
    }
    element
        .elements()
        .filter(|child| child.name.starts_with("p:nv"))
        .find_map(|child| child.child("p:cNvPr")?.attr("name"))
}

fn blip_relation(shape: &Element) -> Option<String> {
    let blip = shape.find(&|candidate| candidate.is("a:blip"))?;
    blip.attr("r:embed").or_else(|| blip.attr("r:link"))
}

/// Stores `filename` under `ppt/media`, reusing an identical existing part.
pub fn add_media(
    package: &mut Package,
    content_types: &mut ContentTypes,
    filename: &str,
    bytes: &[u8],
) -> String {
    let file = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let preferred = format!("ppt/media/{file}");
    let part = match package.get(&preferred) {
        None => preferred,
        Some(existing) if existing == bytes => return preferred,
        Some(_) => {
            let (stem, ext) = file.rsplit_once('.').unwrap_or((file, "bin"));
            package.unique_name("ppt/media", &format!("{stem}-"), ext)
        }
    };
    let ext = extension(&part).to_ascii_lowercase();
    content_types.ensure_default(&ext, media_content_type(&ext));
    package.insert(part.clone(), bytes.to_vec());
    part
}

pub fn media_content_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

fn replace_text(
    shape: &mut Element,
    replacements: &[TextInstruction],
    delimiters: Delimiters,
) -> Result<usize, EngineError> {
    for replacement in replacements {
        if let Some(color) = replacement.by.style.as_ref().and_then(|s| s.color.as_ref())
            && !COLOR_KINDS.contains(&color.kind.as_str())
        {
            return Err(EngineError::UnsupportedColor(color.kind.clone()));
        }
    }

    let mut count = 0;
    for replacement in replacements {
        let tag = delimiters.wrap(&replacement.replace);
        shape.visit_named_mut("a:p", &mut |paragraph| {
            count += replace_in_paragraph(paragraph, &tag, &replacement.by);
            Ok::<(), EngineError>(())
        })?;
    }
    Ok(count)
}

fn run_positions(paragraph: &Element) -> Vec<usize> {
    paragraph
        .children
        .iter()
        .enumerate()
        .filter_map(|(index, node)| match node {
            Node::Element(element) if element.is("a:r") => Some(index),
            _ => None,
        })
        .collect()
}

/// Line breaks, fields and any other non-run element between two runs stop a
/// tag from matching across them.
fn has_barrier(paragraph: &Element, first: usize, last: usize) -> bool {
    paragraph.children.get(first + 1..last).is_some_and(|between| {
        between
            .iter()
            .any(|node| matches!(node, Node::Element(element) if !element.is("a:r")))
    })
}

fn run_at(paragraph: &mut Element, index: usize) -> Option<&mut Element> {
    match paragraph.children.get_mut(index) {
        Some(Node::Element(element)) => Some(element),
        _ => None,
    }
}

fn run_text(paragraph: &Element, index: usize) -> String {
    match paragraph.children.get(index) {
        Some(Node::Element(run)) => run.child("a:t").map(Element::text).unwrap_or_default(),
        _ => String::new(),
    }
}

fn set_run_text(run: &mut Element, text: &str) {
    match run.child_mut("a:t") {
        Some(node) => node.set_text(text),
        None => {
            let mut node = Element::new("a:t");
            node.set_text(text);
            run.push(node);
        }
    }
}

/// Replaces every occurrence of `tag` in the paragraph. A tag split across
/// several runs is first merged into the run where it starts.
fn replace_in_paragraph(paragraph: &mut Element, tag: &str, by: &ReplacementText) -> usize {
    let mut count = 0;
    let mut from = 0;

    loop {
        let runs = run_positions(paragraph);
        let texts: Vec<String> = runs.iter().map(|&index| run_text(paragraph, index)).collect();
        let full: String = texts.concat();
        let Some(found) = full.get(from..).and_then(|rest| rest.find(tag)) else {
            break;
        };
        let start = from + found;
        let end = start + tag.len();

        let mut offset = 0;
        let mut first = None;
        let mut last = None;
        for (run, text) in texts.iter().enumerate() {
            let run_end = offset + text.len();
            if first.is_none() && start < run_end {
                first = Some((run, offset));
            }
            if end <= run_end {
                last = Some(run);
                break;
            }
            offset = run_end;
        }
        let (Some((first, first_offset)), Some(last)) = (first, last) else {
            break;
        };

        if has_barrier(paragraph, runs[first], runs[last]) {
            from = start + 1;
            continue;
        }

        if first != last {
            let merged = texts[first..=last].concat();
            if let Some(run) = run_at(paragraph, runs[first]) {
                set_run_text(run, &merged);
            }
            for &index in runs[first + 1..=last].iter().rev() {
                paragraph.children.remove(index);
            }
            continue;
        }

        let text = &texts[first];
        let local = start - first_offset;
        let before = &text[..local];
        let after = &text[local + tag.len()..];
        let position = runs[first];

        match &by.style {
            None => {
                let replaced = format!("{before}{}{after}", by.text);
                if let Some(run) = run_at(paragraph, position) {
                    set_run_text(run, &replaced);
                }
            }
            Some(style) => {
                let Some(Node::Element(template)) = paragraph.children.get(position).cloned()
                else {
                    break;
                };
                let mut pieces = Vec::new();
                if !before.is_empty() {
                    let mut run = template.clone();
                    set_run_text(&mut run, before);
                    pieces.push(Node::Element(run));
                }
                let mut styled = template.clone();
                set_run_text(&mut styled, &by.text);
                apply_style(&mut styled, style);
                pieces.push(Node::Element(styled));
                if !after.is_empty() {
                    let mut run = template;
                    set_run_text(&mut run, after);
                    pieces.push(Node::Element(run));
                }
                paragraph.children.remove(position);
                for (offset, piece) in pieces.into_iter().enumerate() {
                    paragraph.children.insert(position + offset, piece);
                }
            }
        }

        count += 1;
        from = start + by.text.len();
    }

    count
}

fn apply_style(run: &mut Element, style: &TextStyle) {
    if run.child("a:rPr").is_none() {
        run.insert(0, Element::new("a:rPr"));
    }
    let Some(properties) = run.child_mut("a:rPr") else {
        return;
    };
    if let Some(size) = style.size {
        properties.set_attr("sz", &size.to_string());
    }
    if let Some(bold) = style.bold {
        properties.set_attr("b", if bold { "1" } else { "0" });
    }
    if let Some(italic) = style.italic {
        properties.set_attr("i", if italic { "1" } else { "0" });
    }
    if let Some(color) = &style.color {
        properties.retain_elements(|element| {
            !matches!(element.name.as_str(), "a:solidFill" | "a:noFill" | "a:gradFill")
        });
        let fill = Element::new("a:solidFill")
            .with_child(Element::new(format!("a:{}", color.kind)).with_attr("val", &color.value));
        let index = properties.position("a:ln").map(|index| index + 1).unwrap_or(0);
        properties.insert(index, fill);
    }
}
