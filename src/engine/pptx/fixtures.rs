//! Small synthetic presentations for tests.

use super::package::{CONTENT_TYPES_PART, Package};
use std::path::Path;

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.presentationml";

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

/// A text shape whose run jumps to another slide through `rel_id`.
pub fn hyperlink_shape(name: &str, text: &str, rel_id: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"><a:hlinkClick r:id="{rel_id}" action="ppaction://hlinksldjump"/></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

pub struct TemplateFixture {
    layouts: Vec<String>,
    slides: Vec<String>,
    image: Option<Vec<u8>>,
    jumps: Vec<(usize, usize)>,
}

impl TemplateFixture {
    pub fn new() -> Self {
        Self {
            layouts: vec!["Title Slide".to_string()],
            slides: Vec::new(),
            image: None,
            jumps: Vec::new(),
        }
    }

    pub fn layouts(mut self, names: &[&str]) -> Self {
        self.layouts = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn slide(mut self, shapes: impl Into<String>) -> Self {
        self.slides.push(shapes.into());
        self
    }

    /// Every slide gets an `rId2` image relationship to this media part.
    pub fn image(mut self, bytes: &[u8]) -> Self {
        self.image = Some(bytes.to_vec());
        self
    }

    /// Gives slide `from` an `rId5` slide relationship to slide `to`.
    pub fn slide_jump(mut self, from: usize, to: usize) -> Self {
        self.jumps.push((from, to));
        self
    }

    pub fn build(&self) -> Package {
        let mut package = Package::default();
        let mut overrides = format!(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{CT_BASE}.presentation.main+xml"/>"#
        );
        let mut slide_ids = String::new();
        let mut presentation_rels = String::new();

        for (index, name) in self.layouts.iter().enumerate() {
            let number = index + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slideLayouts/slideLayout{number}.xml" ContentType="{CT_BASE}.slideLayout+xml"/>"#
            ));
            package.insert(
                format!("ppt/slideLayouts/slideLayout{number}.xml"),
                format!(
                    r#"<p:sldLayout {NAMESPACES}><p:cSld name="{name}"><p:spTree/></p:cSld></p:sldLayout>"#
                ),
            );
        }

        for (index, shapes) in self.slides.iter().enumerate() {
            let number = index + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="{CT_BASE}.slide+xml"/><Override PartName="/ppt/notesSlides/notesSlide{number}.xml" ContentType="{CT_BASE}.notesSlide+xml"/>"#
            ));
            slide_ids.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{number}"/>"#,
                255 + number
            ));
            presentation_rels.push_str(&format!(
                r#"<Relationship Id="rId{number}" Type="{REL_BASE}/slide" Target="slides/slide{number}.xml"/>"#
            ));
            package.insert(
                format!("ppt/slides/slide{number}.xml"),
                format!(
                    r#"<p:sld {NAMESPACES}><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#
                ),
            );
            let mut rels = format!(
                r#"<Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId3" Type="{REL_BASE}/notesSlide" Target="../notesSlides/notesSlide{number}.xml"/>"#
            );
            if self.image.is_some() {
                rels.push_str(&format!(
                    r#"<Relationship Id="rId2" Type="{REL_BASE}/image" Target="../media/image1.png"/>"#
                ));
            }
            for (_, to) in self.jumps.iter().filter(|(from, _)| *from == number) {
                rels.push_str(&format!(
                    r#"<Relationship Id="rId5" Type="{REL_BASE}/slide" Target="slide{to}.xml"/>"#
                ));
            }
            package.insert(
                format!("ppt/slides/_rels/slide{number}.xml.rels"),
                relationships(&rels),
            );
            package.insert(
                format!("ppt/notesSlides/notesSlide{number}.xml"),
                format!(r#"<p:notes {NAMESPACES}><p:cSld><p:spTree/></p:cSld></p:notes>"#),
            );
        }

        if let Some(image) = &self.image {
            package.insert("ppt/media/image1.png", image.clone());
        }

        package.insert(
            CONTENT_TYPES_PART,
            format!(
                r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{overrides}</Types>"#
            ),
        );
        package.insert(
            "_rels/.rels",
            relationships(&format!(
                r#"<Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/>"#
            )),
        );
        package.insert(
            "ppt/presentation.xml",
            format!(
                r#"<p:presentation {NAMESPACES}><p:sldMasterIdLst/><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
            ),
        );
        package.insert(
            "ppt/_rels/presentation.xml.rels",
            relationships(&presentation_rels),
        );
        package
    }

    pub fn write(&self, path: &Path) {
        self.build().save(path).expect("save fixture");
    }
}

fn relationships(body: &str) -> String {
    format!(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{body}</Relationships>"#
    )
}
