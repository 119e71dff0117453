use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::services::matrix_loader::decode_bytes;

/// Errors that can occur while loading the character index
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read character index: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Character index is missing column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct IndexRow {
    name: Option<String>,
    id: Option<String>,
    deploy: Option<String>,
}

/// Maps character names to card ids and their deploy flags
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    name_to_ids: IndexMap<String, Vec<i64>>,
    id_deploy: HashMap<i64, bool>,
}

impl CharacterRegistry {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let bytes = std::fs::read(path)?;
        Self::parse(&decode_bytes(&bytes))
    }

    /// Parse the index CSV; rows lacking a name, id or deploy value are skipped
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        for column in ["name", "id", "deploy"] {
            if !headers.iter().any(|h| h == column) {
                return Err(RegistryError::MissingColumn(column));
            }
        }

        let mut registry = Self::default();
        let mut skipped = 0usize;
        for row in reader.deserialize::<IndexRow>() {
            let row = row?;
            let parsed = match (row.name, row.id, row.deploy) {
                (Some(name), Some(id), Some(deploy)) if !name.is_empty() => {
                    parse_int(&id).zip(parse_int(&deploy)).map(|(id, deploy)| (name, id, deploy))
                }
                _ => None,
            };
            match parsed {
                Some((name, id, deploy)) => registry.insert(name, id, deploy == 1),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} incomplete character index rows", skipped);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: impl Into<String>, id: i64, deployed: bool) {
        self.name_to_ids.entry(name.into()).or_default().push(id);
        self.id_deploy.insert(id, deployed);
    }

    pub fn len(&self) -> usize {
        self.name_to_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_ids.is_empty()
    }

    pub fn ids_for(&self, name: &str) -> &[i64] {
        self.name_to_ids.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_deployed_id(&self, id: i64) -> bool {
        self.id_deploy.get(&id).copied().unwrap_or(false)
    }

    /// A character counts as deployed when any of its ids is
    pub fn is_character_deployed(&self, name: &str) -> bool {
        self.ids_for(name).iter().any(|&id| self.is_deployed_id(id))
    }

    /// Deployed ids for `names`, in name order then id order
    pub fn deployed_ids<S: AsRef<str>>(&self, names: &[S]) -> Vec<i64> {
        names
            .iter()
            .flat_map(|name| self.ids_for(name.as_ref()))
            .copied()
            .filter(|&id| self.is_deployed_id(id))
            .collect()
    }
}

// The index is exported from a spreadsheet, so ids can arrive as "12.0"
fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}
