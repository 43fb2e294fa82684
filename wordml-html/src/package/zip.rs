//! `.docx` archive reader

use super::{DocumentPackage, EmbeddedPart, PartKind, Relationship};
use crate::error::ConvertError;
use crate::names::package::*;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

#[derive(Debug, Clone)]
struct PackageRelationship {
    rel_type: String,
    target: String,
    external: bool,
}

/// A `.docx` package read fully into memory.
#[derive(Debug, Clone)]
pub struct ZipPackage {
    entries: HashMap<String, Vec<u8>>,
    main_path: String,
    relationships: HashMap<String, PackageRelationship>,
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ZipPackage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, ConvertError> {
        let mut archive = ::zip::ZipArchive::new(reader)?;
        let mut entries = HashMap::new();
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            entries.insert(name, bytes);
        }
        log::debug!("read {} package entries", entries.len());

        let (defaults, overrides) = match entries.get("[Content_Types].xml") {
            Some(bytes) => parse_content_types(&decode_text(bytes))?,
            None => (HashMap::new(), HashMap::new()),
        };

        let package_rels = match entries.get("_rels/.rels") {
            Some(bytes) => parse_relationships(&decode_text(bytes), "", "_rels/.rels")?,
            None => HashMap::new(),
        };
        let main_path = package_rels
            .values()
            .find(|rel| rel.rel_type == REL_OFFICE_DOCUMENT && !rel.external)
            .map(|rel| rel.target.clone())
            .or_else(|| {
                entries
                    .contains_key("word/document.xml")
                    .then(|| "word/document.xml".to_string())
            })
            .ok_or_else(|| ConvertError::MissingPart("main document".to_string()))?;

        let (dir, file_name) = split_path(&main_path);
        let rels_path = if dir.is_empty() {
            format!("_rels/{file_name}.rels")
        } else {
            format!("{dir}/_rels/{file_name}.rels")
        };
        let relationships = match entries.get(&rels_path) {
            Some(bytes) => parse_relationships(&decode_text(bytes), dir, &rels_path)?,
            None => HashMap::new(),
        };

        Ok(Self {
            entries,
            main_path,
            relationships,
            defaults,
            overrides,
        })
    }

    fn text_entry(&self, path: &str) -> Option<String> {
        self.entries.get(path).map(|bytes| decode_text(bytes))
    }

    fn content_type(&self, path: &str) -> Option<String> {
        if let Some(ct) = self.overrides.get(path) {
            return Some(ct.clone());
        }
        let extension = path.rsplit('.').next()?.to_ascii_lowercase();
        self.defaults.get(&extension).cloned()
    }
}

impl DocumentPackage for ZipPackage {
    fn main_document(&self) -> Result<String, ConvertError> {
        self.text_entry(&self.main_path)
            .ok_or_else(|| ConvertError::MissingPart(self.main_path.clone()))
    }

    fn part_xml(&self, kind: PartKind) -> Result<Option<String>, ConvertError> {
        let rel_type = match kind {
            PartKind::Styles => REL_STYLES,
            PartKind::Settings => REL_SETTINGS,
            PartKind::Numbering => REL_NUMBERING,
            PartKind::Footnotes => REL_FOOTNOTES,
            PartKind::Endnotes => REL_ENDNOTES,
            PartKind::Comments => REL_COMMENTS,
        };
        Ok(self
            .relationships
            .values()
            .find(|rel| rel.rel_type == rel_type && !rel.external)
            .and_then(|rel| self.text_entry(&rel.target)))
    }

    fn relationship(&self, id: &str) -> Option<Relationship> {
        self.relationships.get(id).map(|rel| Relationship {
            target: rel.target.clone(),
            external: rel.external,
        })
    }

    fn embedded_part(&self, id: &str) -> Option<EmbeddedPart> {
        let rel = self.relationships.get(id)?;
        if rel.external {
            return None;
        }
        let bytes = self.entries.get(&rel.target)?.clone();
        let content_type = self.content_type(&rel.target).unwrap_or_default();
        Some(EmbeddedPart {
            bytes,
            content_type,
        })
    }
}

fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_start_matches('\u{feff}').to_string()
}

fn parse_content_types(
    xml: &str,
) -> Result<(HashMap<String, String>, HashMap<String, String>), ConvertError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ConvertError::Xml {
        part: "[Content_Types].xml".to_string(),
        message: e.to_string(),
    })?;
    let mut defaults = HashMap::new();
    let mut overrides = HashMap::new();
    for node in doc.root_element().children().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(CONTENT_TYPES) {
            continue;
        }
        let Some(content_type) = node.attribute("ContentType") else {
            continue;
        };
        match node.tag_name().name() {
            "Default" => {
                if let Some(ext) = node.attribute("Extension") {
                    defaults.insert(ext.to_ascii_lowercase(), content_type.to_string());
                }
            }
            "Override" => {
                if let Some(part) = node.attribute("PartName") {
                    overrides.insert(
                        part.trim_start_matches('/').to_string(),
                        content_type.to_string(),
                    );
                }
            }
            _ => {}
        }
    }
    Ok((defaults, overrides))
}

fn parse_relationships(
    xml: &str,
    base_dir: &str,
    part_name: &str,
) -> Result<HashMap<String, PackageRelationship>, ConvertError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ConvertError::Xml {
        part: part_name.to_string(),
        message: e.to_string(),
    })?;
    let mut rels = HashMap::new();
    for node in doc.root_element().children().filter(|n| n.is_element()) {
        if !node.has_tag_name((RELATIONSHIPS, "Relationship")) {
            continue;
        }
        let (Some(id), Some(rel_type), Some(target)) = (
            node.attribute("Id"),
            node.attribute("Type"),
            node.attribute("Target"),
        ) else {
            continue;
        };
        let external = node.attribute("TargetMode") == Some("External");
        let target = if external {
            target.to_string()
        } else {
            resolve_part_path(base_dir, target)
        };
        rels.insert(
            id.to_string(),
            PackageRelationship {
                rel_type: rel_type.to_string(),
                target,
                external,
            },
        );
    }
    Ok(rels)
}

fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_part_path(base_dir: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if base_dir.is_empty() {
        target.to_string()
    } else {
        format!("{base_dir}/{target}")
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
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
