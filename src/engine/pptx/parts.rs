use super::xml::{self, Element, XmlError};

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Compares the last segment of the relationship type URI.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let root = xml::parse(bytes)?;
        let items = root
            .elements()
            .filter(|element| element.is("Relationship"))
            .filter_map(|element| {
                Some(Relationship {
                    id: element.attr("Id")?,
                    rel_type: element.attr("Type")?,
                    target: element.attr("Target")?,
                    external: element.attr("TargetMode").as_deref() == Some("External"),
                })
            })
            .collect();
        Ok(Self { items })
    }

    pub fn to_xml(&self) -> String {
        let mut root = Element::new("Relationships").with_attr("xmlns", RELATIONSHIPS_NS);
        for item in &self.items {
            let mut element = Element::new("Relationship")
                .with_attr("Id", &item.id)
                .with_attr("Type", &item.rel_type)
                .with_attr("Target", &item.target);
            if item.external {
                element.set_attr("TargetMode", "External");
            }
            root.push(element);
        }
        root.to_document()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Relationship> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Adds an internal relationship and returns its new id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    fn next_id(&self) -> String {
        let highest = self
            .items
            .iter()
            .filter_map(|item| item.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", highest + 1)
    }
}

#[derive(Debug, Clone)]
pub struct ContentTypes {
    root: Element,
}

impl ContentTypes {
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        Ok(Self {
            root: xml::parse(bytes)?,
        })
    }

    pub fn to_xml(&self) -> String {
        self.root.to_document()
    }

    pub fn default_for(&self, extension: &str) -> Option<String> {
        self.root
            .elements()
            .filter(|element| element.is("Default"))
            .find(|element| {
                element
                    .attr("Extension")
                    .is_some_and(|value| value.eq_ignore_ascii_case(extension))
            })
            .and_then(|element| element.attr("ContentType"))
    }

    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if self.default_for(extension).is_some() {
            return;
        }
        let index = self
            .root
            .children
            .iter()
            .rposition(|node| matches!(node, xml::Node::Element(element) if element.is("Default")))
            .map(|index| index + 1)
            .unwrap_or(0);
        self.root.insert(
            index,
            Element::new("Default")
                .with_attr("Extension", extension)
                .with_attr("ContentType", content_type),
        );
    }

    pub fn override_for(&self, part: &str) -> Option<String> {
        let part_name = part_name(part);
        self.root
            .elements()
            .filter(|element| element.is("Override"))
            .find(|element| element.attr("PartName").as_deref() == Some(part_name.as_str()))
            .and_then(|element| element.attr("ContentType"))
    }

    pub fn set_override(&mut self, part: &str, content_type: &str) {
        self.remove_override(part);
        self.root.push(
            Element::new("Override")
                .with_attr("PartName", &part_name(part))
                .with_attr("ContentType", content_type),
        );
    }

    pub fn remove_override(&mut self, part: &str) {
        let part_name = part_name(part);
        self.root.retain_elements(|element| {
            !(element.is("Override") && element.attr("PartName").as_deref() == Some(part_name.as_str()))
        });
    }
}

fn part_name(part: &str) -> String {
    format!("/{}", part.trim_start_matches('/'))
}
