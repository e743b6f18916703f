use super::parts::{ContentTypes, Relationships};
use super::xml::{self, Element};
use crate::engine::EngineError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// All parts of an OPC package, keyed by part name without leading slash.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|source| EngineError::Package {
            path: path.display().to_string(),
            source,
        })?;

        let mut parts = BTreeMap::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|source| EngineError::Package {
                    path: path.display().to_string(),
                    source,
                })?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            parts.insert(name, bytes);
        }
        Ok(Self { parts })
    }

    /// Writes the package through a temporary file in the destination
    /// directory, replacing `path` only once the archive is complete.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;

        {
            let mut writer = ZipWriter::new(temp.as_file_mut());
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            let ordered = self
                .parts
                .iter()
                .filter(|(name, _)| name.as_str() == CONTENT_TYPES_PART)
                .chain(
                    self.parts
                        .iter()
                        .filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART),
                );
            for (name, bytes) in ordered {
                writer
                    .start_file(name.as_str(), options)
                    .map_err(|source| zip_write_error(path, source))?;
                writer.write_all(bytes)?;
            }
            writer
                .finish()
                .map_err(|source| zip_write_error(path, source))?;
        }

        temp.persist(path).map_err(|err| EngineError::Io(err.error))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), bytes.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn xml(&self, name: &str) -> Result<Element, EngineError> {
        let bytes = self.get(name).ok_or_else(|| EngineError::Malformed {
            part: name.to_string(),
            message: "part is missing".to_string(),
        })?;
        xml::parse(bytes).map_err(|source| EngineError::Xml {
            part: name.to_string(),
            source,
        })
    }

    /// Relationships of `part`; a part without a rels file has none.
    pub fn relationships(&self, part: &str) -> Result<Relationships, EngineError> {
        let rels = rels_path(part);
        match self.get(&rels) {
            Some(bytes) => Relationships::parse(bytes)
                .map_err(|source| EngineError::Xml { part: rels, source }),
            None => Ok(Relationships::default()),
        }
    }

    pub fn content_types(&self) -> Result<ContentTypes, EngineError> {
        let bytes = self
            .get(CONTENT_TYPES_PART)
            .ok_or_else(|| EngineError::Malformed {
                part: CONTENT_TYPES_PART.to_string(),
                message: "part is missing".to_string(),
            })?;
        ContentTypes::parse(bytes).map_err(|source| EngineError::Xml {
            part: CONTENT_TYPES_PART.to_string(),
            source,
        })
    }

    /// First free part name of the form `{dir}/{stem}{n}.{ext}`.
    pub fn unique_name(&self, dir: &str, stem: &str, extension: &str) -> String {
        (1..)
            .map(|index| format!("{dir}/{stem}{index}.{extension}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| format!("{dir}/{stem}.{extension}"))
    }
}

fn zip_write_error(path: &Path, source: zip::result::ZipError) -> EngineError {
    EngineError::Package {
        path: path.display().to_string(),
        source,
    }
}

pub fn rels_path(part: &str) -> String {
    let (dir, file) = split_part(part);
    if dir.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{dir}/_rels/{file}.rels")
    }
}

/// Part that owns a `_rels/*.rels` file, the inverse of [`rels_path`].
pub fn owner_part(rels: &str) -> Option<String> {
    let (dir, file) = split_part(rels);
    let dir = dir.strip_suffix("_rels")?.trim_end_matches('/');
    let file = file.strip_suffix(".rels")?;
    Some(if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    })
}

/// Resolves a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let (dir, _) = split_part(source_part);
    let mut segments: Vec<&str> = dir.split('/').filter(|segment| !segment.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Target of `to_part` as written in a relationship owned by `from_part`.
pub fn relative_target(from_part: &str, to_part: &str) -> String {
    let (from_dir, _) = split_part(from_part);
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to_part.split('/').filter(|s| !s.is_empty()).collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(left, right)| left == right)
        .count()
        .min(to.len().saturating_sub(1));
    let mut segments: Vec<&str> = vec![".."; from.len() - common];
    segments.extend_from_slice(&to[common..]);
    segments.join("/")
}

pub fn split_part(part: &str) -> (&str, &str) {
    match part.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", part),
    }
}

pub fn extension(part: &str) -> &str {
    let (_, file) = split_part(part);
    file.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}
