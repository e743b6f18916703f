//! Composition engine over `.pptx` packages.
//!
//! Slides are copied out of loaded templates into the root presentation.
//! Layouts are matched by name against the root's layouts, images and other
//! referenced parts are copied flat, and speaker notes are dropped.

pub mod package;
pub mod parts;
pub mod slide;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::engine::{
    CompositionEngine, EngineConfig, EngineError, SlideModifier, WriteSummary,
};
use package::{
    Package, extension, owner_part, rels_path, relative_target, resolve_target, split_part,
};
use parts::{ContentTypes, Relationships};
use slide::{PptxSlide, media_content_type};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use tracing::{debug, info};
use xml::Element;

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const LAYOUT_DIR: &str = "ppt/slideLayouts";
const SLIDE_DIR: &str = "ppt/slides";
const MEDIA_DIR: &str = "ppt/media/";
const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const FIRST_SLIDE_ID: u32 = 256;
const LIST_PREDECESSORS: [&str; 3] = [
    "p:sldMasterIdLst",
    "p:notesMasterIdLst",
    "p:handoutMasterIdLst",
];

pub struct PptxAutomizer {
    config: EngineConfig,
    root: Option<Presentation>,
    templates: Vec<SourceTemplate>,
    media: HashMap<String, Vec<u8>>,
}

struct SourceTemplate {
    label: Option<String>,
    filename: String,
    presentation: Presentation,
}

#[derive(Clone)]
struct Presentation {
    package: Package,
    part: String,
    xml: Element,
    rels: Relationships,
    content_types: ContentTypes,
    layouts: Vec<(String, String)>,
}

impl CompositionEngine for PptxAutomizer {
    fn create(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            config,
            root: None,
            templates: Vec::new(),
            media: HashMap::new(),
        })
    }

    fn load_root(&mut self, filename: &str) -> Result<(), EngineError> {
        let mut presentation = self.open_template(filename)?;
        self.templates.push(SourceTemplate {
            label: None,
            filename: filename.to_string(),
            presentation: presentation.clone(),
        });
        if self.config.remove_existing_slides {
            let removed = presentation.remove_all_slides()?;
            debug!(root = filename, removed, "removed existing slides");
        }
        info!(root = filename, "loaded root template");
        self.root = Some(presentation);
        Ok(())
    }

    fn load(&mut self, filename: &str, label: &str) -> Result<(), EngineError> {
        let presentation = self.open_template(filename)?;
        self.templates.push(SourceTemplate {
            label: Some(label.to_string()),
            filename: filename.to_string(),
            presentation,
        });
        debug!(template = filename, label, "loaded template");
        Ok(())
    }

    fn load_media(&mut self, filenames: &[String]) -> Result<(), EngineError> {
        for filename in filenames {
            let path = self.config.media_dir.join(filename);
            if !path.is_file() {
                return Err(EngineError::MediaNotFound(filename.clone()));
            }
            let bytes = fs::read(&path)?;
            debug!(media = %filename, bytes = bytes.len(), "loaded media");
            self.media.insert(filename.clone(), bytes);
        }
        Ok(())
    }

    fn append_slide(
        &mut self,
        template: &str,
        slide_number: u32,
        modifier: &dyn SlideModifier,
    ) -> Result<(), EngineError> {
        let root = self.root.as_mut().ok_or(EngineError::RootNotLoaded)?;
        let source = find_template(&self.templates, template)
            .ok_or_else(|| EngineError::TemplateNotFound(template.to_string()))?;
        let source_part =
            source
                .presentation
                .slide_part(slide_number)
                .ok_or_else(|| EngineError::SlideNotFound {
                    template: template.to_string(),
                    slide_number,
                })?;

        let mut xml = source.presentation.package.xml(&source_part)?;
        let mut rels = source.presentation.package.relationships(&source_part)?;
        let part = root.package.unique_name(SLIDE_DIR, "slide", "xml");
        root.adopt_relationships(&source.presentation, &source_part, &part, &mut xml, &mut rels)?;

        {
            let mut handle = PptxSlide {
                template,
                slide_number,
                part: &part,
                xml: &mut xml,
                rels: &mut rels,
                package: &mut root.package,
                content_types: &mut root.content_types,
                media: &self.media,
            };
            modifier.apply(&mut handle)?;
        }

        root.package.insert(part.clone(), xml.to_document());
        root.package.insert(rels_path(&part), rels.to_xml());
        root.content_types.set_override(&part, SLIDE_CONTENT_TYPE);
        root.link_slide(&part);
        debug!(template, slide_number, part = %part, "appended slide");
        Ok(())
    }

    fn write(&mut self, filename: &str) -> Result<WriteSummary, EngineError> {
        let root = self.root.as_mut().ok_or(EngineError::RootNotLoaded)?;
        let path = self.config.output_dir.join(filename);
        let pruned = root.prune_media()?;
        if pruned > 0 {
            debug!(pruned, "dropped unreferenced media");
        }
        root.flush();
        root.package.save(&path)?;

        let summary = WriteSummary {
            slides: slide_entries(&root.xml).len(),
            images: root.slide_media()?.len(),
        };
        info!(
            path = %path.display(),
            slides = summary.slides,
            images = summary.images,
            "wrote presentation"
        );
        Ok(summary)
    }
}

impl PptxAutomizer {
    fn open_template(&self, filename: &str) -> Result<Presentation, EngineError> {
        let path = self.config.template_dir.join(filename);
        if !path.is_file() {
            return Err(EngineError::TemplateNotFound(filename.to_string()));
        }
        Presentation::open(Package::open(&path)?)
    }
}

/// Labels win over filenames; a later duplicate label shadows an earlier one.
fn find_template<'t>(templates: &'t [SourceTemplate], name: &str) -> Option<&'t SourceTemplate> {
    templates
        .iter()
        .rev()
        .find(|template| template.label.as_deref() == Some(name))
        .or_else(|| {
            templates
                .iter()
                .rev()
                .find(|template| template.filename == name)
        })
}

fn slide_entries(presentation: &Element) -> Vec<(u32, String)> {
    let Some(list) = presentation.child("p:sldIdLst") else {
        return Vec::new();
    };
    list.elements()
        .filter(|element| element.is("p:sldId"))
        .filter_map(|element| {
            let id = element.attr("id")?.parse().ok()?;
            Some((id, element.attr("r:id")?))
        })
        .collect()
}

fn part_index(part: &str) -> u32 {
    let (_, file) = split_part(part);
    let stem = file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file);
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[stem.len() - digits..].parse().unwrap_or(0)
}

impl Presentation {
    fn open(package: Package) -> Result<Self, EngineError> {
        let part = package
            .relationships("")?
            .iter()
            .find(|rel| rel.is_kind("officeDocument") && !rel.external)
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string());
        let xml = package.xml(&part)?;
        let rels = package.relationships(&part)?;
        let content_types = package.content_types()?;

        let mut layout_parts: Vec<String> = package
            .names()
            .filter(|name| {
                split_part(name).0 == LAYOUT_DIR && extension(name) == "xml"
            })
            .map(str::to_string)
            .collect();
        layout_parts.sort_by_key(|name| part_index(name));
        let mut layouts = Vec::with_capacity(layout_parts.len());
        for layout in layout_parts {
            let name = layout_name(&package, &layout)?;
            layouts.push((name, layout));
        }

        Ok(Self {
            package,
            part,
            xml,
            rels,
            content_types,
            layouts,
        })
    }

    fn slide_part(&self, slide_number: u32) -> Option<String> {
        let index = usize::try_from(slide_number).ok()?.checked_sub(1)?;
        let entries = slide_entries(&self.xml);
        let (_, rel_id) = entries.get(index)?;
        let rel = self.rels.get(rel_id)?;
        Some(resolve_target(&self.part, &rel.target))
    }

    fn remove_all_slides(&mut self) -> Result<usize, EngineError> {
        let entries = slide_entries(&self.xml);
        for (_, rel_id) in &entries {
            let Some(rel) = self.rels.remove(rel_id) else {
                continue;
            };
            let part = resolve_target(&self.part, &rel.target);
            for notes in self.package.relationships(&part)?.iter() {
                if notes.is_kind("notesSlide") && !notes.external {
                    self.remove_part(&resolve_target(&part, &notes.target));
                }
            }
            self.remove_part(&part);
        }
        if let Some(list) = self.xml.child_mut("p:sldIdLst") {
            list.retain_elements(|element| !element.is("p:sldId"));
        }
        self.xml.remove_descendants("p14:sectionLst");
        Ok(entries.len())
    }

    fn remove_part(&mut self, part: &str) {
        self.package.remove(part);
        self.package.remove(&rels_path(part));
        self.content_types.remove_override(part);
    }

    /// Rewrites a copied slide's relationships so they resolve inside this
    /// presentation. Links to other slides are dropped together with the
    /// hyperlinks that use them.
    fn adopt_relationships(
        &mut self,
        source: &Presentation,
        source_part: &str,
        part: &str,
        xml: &mut Element,
        rels: &mut Relationships,
    ) -> Result<(), EngineError> {
        let originals: Vec<_> = rels.iter().cloned().collect();
        let mut copied: HashMap<String, String> = HashMap::new();

        for rel in originals {
            if rel.external {
                continue;
            }
            let source_target = resolve_target(source_part, &rel.target);
            if rel.is_kind("notesSlide") || rel.is_kind("slide") {
                rels.remove(&rel.id);
                xml.remove_descendants_where(&|element| {
                    matches!(element.name.as_str(), "a:hlinkClick" | "a:hlinkHover")
                        && element.attr("r:id").as_deref() == Some(rel.id.as_str())
                });
                continue;
            }
            let target_part = if rel.is_kind("slideLayout") {
                let name = layout_name(&source.package, &source_target)?;
                self.layout_for(&name)?
            } else if let Some(existing) = copied.get(&source_target) {
                existing.clone()
            } else {
                let new_part = self.copy_part(source, &source_target)?;
                copied.insert(source_target, new_part.clone());
                new_part
            };
            if let Some(entry) = rels.get_mut(&rel.id) {
                entry.target = relative_target(part, &target_part);
            }
        }
        Ok(())
    }

    /// Drops media parts that no relationship in the package points at.
    fn prune_media(&mut self) -> Result<usize, EngineError> {
        let own_rels = rels_path(&self.part);
        let mut referenced: HashSet<String> = self
            .rels
            .iter()
            .filter(|rel| !rel.external)
            .map(|rel| resolve_target(&self.part, &rel.target))
            .collect();
        let owners: Vec<String> = self
            .package
            .names()
            .filter(|name| *name != own_rels)
            .filter_map(owner_part)
            .collect();
        for owner in owners {
            for rel in self.package.relationships(&owner)?.iter() {
                if !rel.external {
                    referenced.insert(resolve_target(&owner, &rel.target));
                }
            }
        }

        let orphans: Vec<String> = self
            .package
            .names()
            .filter(|name| name.starts_with(MEDIA_DIR) && !referenced.contains(*name))
            .map(str::to_string)
            .collect();
        for orphan in &orphans {
            self.remove_part(orphan);
        }
        Ok(orphans.len())
    }

    /// Media parts referenced by the slides listed in `p:sldIdLst`.
    fn slide_media(&self) -> Result<BTreeSet<String>, EngineError> {
        let mut media = BTreeSet::new();
        for (_, rel_id) in slide_entries(&self.xml) {
            let Some(rel) = self.rels.get(&rel_id) else {
                continue;
            };
            let slide = resolve_target(&self.part, &rel.target);
            for item in self.package.relationships(&slide)?.iter() {
                let target = resolve_target(&slide, &item.target);
                if !item.external && target.starts_with(MEDIA_DIR) {
                    media.insert(target);
                }
            }
        }
        Ok(media)
    }

    fn layout_for(&self, name: &str) -> Result<String, EngineError> {
        self.layouts
            .iter()
            .find(|(candidate, _)| candidate == name)
            .or_else(|| self.layouts.first())
            .map(|(_, part)| part.clone())
            .ok_or_else(|| EngineError::Malformed {
                part: LAYOUT_DIR.to_string(),
                message: "presentation has no slide layouts".to_string(),
            })
    }

    fn copy_part(&mut self, source: &Presentation, source_part: &str) -> Result<String, EngineError> {
        let bytes = source
            .package
            .get(source_part)
            .ok_or_else(|| EngineError::Malformed {
                part: source_part.to_string(),
                message: "referenced part is missing".to_string(),
            })?;
        let (dir, file) = split_part(source_part);
        let ext = extension(source_part);
        let stem = file
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(file)
            .trim_end_matches(|c: char| c.is_ascii_digit());
        let stem = if stem.is_empty() { "part" } else { stem };
        let new_part = self.package.unique_name(dir, stem, ext);
        self.package.insert(new_part.clone(), bytes.to_vec());

        match source.content_types.override_for(source_part) {
            Some(content_type) => self.content_types.set_override(&new_part, &content_type),
            None => {
                let lower = ext.to_ascii_lowercase();
                let content_type = source
                    .content_types
                    .default_for(&lower)
                    .unwrap_or_else(|| media_content_type(&lower).to_string());
                self.content_types.ensure_default(&lower, &content_type);
            }
        }
        if source.package.contains(&rels_path(source_part)) {
            debug!(part = source_part, "relationships of copied part are not carried over");
        }
        Ok(new_part)
    }

    fn link_slide(&mut self, part: &str) {
        let rel_id = self
            .rels
            .add(SLIDE_REL_TYPE, &relative_target(&self.part, part));
        let id = slide_entries(&self.xml)
            .iter()
            .map(|(id, _)| id + 1)
            .max()
            .unwrap_or(FIRST_SLIDE_ID)
            .max(FIRST_SLIDE_ID);

        if self.xml.child("p:sldIdLst").is_none() {
            let index = LIST_PREDECESSORS
                .iter()
                .filter_map(|name| self.xml.position(name))
                .max()
                .map(|index| index + 1)
                .unwrap_or(0);
            self.xml.insert(index, Element::new("p:sldIdLst"));
        }
        if let Some(list) = self.xml.child_mut("p:sldIdLst") {
            list.push(
                Element::new("p:sldId")
                    .with_attr("id", &id.to_string())
                    .with_attr("r:id", &rel_id),
            );
        }
    }

    fn flush(&mut self) {
        self.package.insert(self.part.clone(), self.xml.to_document());
        self.package.insert(rels_path(&self.part), self.rels.to_xml());
        self.package
            .insert(package::CONTENT_TYPES_PART, self.content_types.to_xml());
    }
}

fn layout_name(package: &Package, layout: &str) -> Result<String, EngineError> {
    let xml = package.xml(layout)?;
    Ok(xml
        .child("p:cSld")
        .and_then(|data| data.attr("name"))
        .unwrap_or_default())
}
