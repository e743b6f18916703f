use super::replacement::{DELIMITERS, map_replacements};
use super::request::SlideSpec;
use crate::engine::{EngineError, Modification, SlideHandle, SlideModifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedModification {
    pub element: String,
    pub modification: Modification,
}

/// The edits for one appended slide: text groups first, then images, each in
/// the order they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePlan {
    template: String,
    slide_number: u32,
    modifications: Vec<PlannedModification>,
}

impl SlidePlan {
    pub fn from_spec(spec: &SlideSpec) -> Self {
        let text = spec.text_replacements.iter().flatten().map(|group| PlannedModification {
            element: group.element.clone(),
            modification: Modification::ReplaceText {
                replacements: map_replacements(&group.replacements),
                delimiters: DELIMITERS,
            },
        });
        let images = spec
            .image_replacements
            .iter()
            .flatten()
            .map(|image| PlannedModification {
                element: image.element.clone(),
                modification: Modification::SetRelationTarget {
                    target: image.media_file.clone(),
                },
            });

        Self {
            template: spec.template.clone(),
            slide_number: spec.slide_number,
            modifications: text.chain(images).collect(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn slide_number(&self) -> u32 {
        self.slide_number
    }

    pub fn modifications(&self) -> &[PlannedModification] {
        &self.modifications
    }
}

impl SlideModifier for SlidePlan {
    fn apply(&self, slide: &mut dyn SlideHandle) -> Result<(), EngineError> {
        for planned in &self.modifications {
            slide.modify_element(&planned.element, &planned.modification)?;
        }
        Ok(())
    }
}
