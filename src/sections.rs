//! The `searchdata.js` section manifest and chunk file naming.
//!
//! The generator splits its index into sections (`all`, `classes`,
//! `functions`, ...) and each section into chunks, one per leading
//! character. Chunk files are named `<section>_<position>.js` with the
//! position in lowercase hexadecimal.

use crate::codec::{ParseError, Value, parse_bindings};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Manifest file name inside a search directory.
pub const MANIFEST_FILE: &str = "searchdata.js";

const CONTENT_VAR: &str = "indexSectionsWithContent";
const NAMES_VAR: &str = "indexSectionNames";
const LABELS_VAR: &str = "indexSectionLabels";

static CHUNK_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9]*)_([0-9a-f]+)\.js$").expect("valid regex"));

/// Error returned when the manifest cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SectionError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error("no `{0}` variable found")]
    MissingVariable(&'static str),
    #[error("`{var}` must be an object of strings")]
    NotStringMap { var: &'static str },
    #[error("`{var}` has non-numeric section id '{key}'")]
    BadSectionId { var: &'static str, key: String },
    #[error("section {id} has no name")]
    Unnamed { id: u32 },
}

/// One section of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    /// File name prefix, e.g. `functions`.
    pub name: String,
    /// Human label, e.g. `Functions`.
    pub label: String,
    /// Leading characters that have a chunk, in chunk order.
    pub letters: String,
}

impl Section {
    /// Chunk files this section should have on disk.
    pub fn chunk_files(&self) -> impl Iterator<Item = SectionFile> + '_ {
        (0..self.letters.chars().count()).map(|chunk| SectionFile {
            section: self.name.clone(),
            chunk: chunk as u32,
        })
    }

    /// Leading character served by `chunk`.
    pub fn letter(&self, chunk: u32) -> Option<char> {
        self.letters.chars().nth(chunk as usize)
    }
}

/// All sections listed in a manifest, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIndex {
    pub sections: Vec<Section>,
}

impl SectionIndex {
    /// Parses `searchdata.js`. Labels are optional and default to the name.
    pub fn parse(source: &str) -> Result<Self, SectionError> {
        let bindings = parse_bindings(source)?;
        let find = |var: &'static str| bindings.iter().find(|b| b.name == var).map(|b| &b.value);

        let content = find(CONTENT_VAR).ok_or(SectionError::MissingVariable(CONTENT_VAR))?;
        let names = find(NAMES_VAR).ok_or(SectionError::MissingVariable(NAMES_VAR))?;
        let content = string_map(CONTENT_VAR, content)?;
        let names = string_map(NAMES_VAR, names)?;
        let labels = find(LABELS_VAR)
            .map(|v| string_map(LABELS_VAR, v))
            .transpose()?
            .unwrap_or_default();

        let mut sections = content
            .into_iter()
            .map(|(id, letters)| {
                let name = names
                    .iter()
                    .find(|(n, _)| *n == id)
                    .map(|(_, name)| name.clone())
                    .ok_or(SectionError::Unnamed { id })?;
                let label = labels
                    .iter()
                    .find(|(n, _)| *n == id)
                    .map_or_else(|| name.clone(), |(_, label)| label.clone());
                Ok(Section {
                    id,
                    name,
                    label,
                    letters,
                })
            })
            .collect::<Result<Vec<_>, SectionError>>()?;
        sections.sort_by_key(|s| s.id);

        Ok(Self { sections })
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Every chunk file named by the manifest, section by section.
    pub fn chunk_files(&self) -> impl Iterator<Item = SectionFile> + '_ {
        self.sections.iter().flat_map(Section::chunk_files)
    }
}

fn string_map(var: &'static str, value: &Value) -> Result<Vec<(u32, String)>, SectionError> {
    let Value::Object(members) = value else {
        return Err(SectionError::NotStringMap { var });
    };
    members
        .iter()
        .map(|(key, value)| {
            let id = key.parse().map_err(|_| SectionError::BadSectionId {
                var,
                key: key.clone(),
            })?;
            match value {
                Value::Str(s) => Ok((id, s.clone())),
                _ => Err(SectionError::NotStringMap { var }),
            }
        })
        .collect()
}

/// A chunk file identity, e.g. `functions_9.js`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionFile {
    pub section: String,
    pub chunk: u32,
}

impl SectionFile {
    /// Recognizes `<section>_<hex>.js`. Returns `None` for the manifest and
    /// any other file.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let caps = CHUNK_FILE_RE.captures(file_name)?;
        let chunk = u32::from_str_radix(&caps[2], 16).ok()?;
        Some(Self {
            section: caps[1].to_string(),
            chunk,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}_{:x}.js", self.section, self.chunk)
    }
}

impl fmt::Display for SectionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
