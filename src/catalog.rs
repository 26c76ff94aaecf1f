use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::model::OfficeDefinition;

const ROMAN_REPUBLIC_OFFICES: &str = include_str!("../data/offices.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<serde_json::Value>),
    Wrapped { offices: Vec<serde_json::Value> },
}

/// Validated, immutable set of office definitions in catalogue order.
#[derive(Debug, Clone, Default)]
pub struct OfficeCatalog {
    offices: Vec<OfficeDefinition>,
    index: BTreeMap<String, usize>,
}

impl OfficeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default cursus honorum shipped with the crate.
    pub fn roman_republic() -> Self {
        match Self::from_json_str(ROMAN_REPUBLIC_OFFICES) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!("bundled office catalogue failed to parse: {err}");
                Self::empty()
            }
        }
    }

    /// Build a catalogue from already-typed definitions, dropping invalid entries.
    pub fn from_definitions(definitions: impl IntoIterator<Item = OfficeDefinition>) -> Self {
        let mut catalog = Self::empty();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog.warn_unknown_prerequisites();
        catalog
    }

    /// Parse a JSON document (a bare array, or `{"offices": [...]}`).
    ///
    /// Only a document that is not a list at all is an error; individual malformed
    /// entries are skipped with a warning.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::List(items) => items,
            CatalogDocument::Wrapped { offices } => offices,
        };

        let mut catalog = Self::empty();
        for (position, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<OfficeDefinition>(value) {
                Ok(definition) => catalog.insert(definition),
                Err(err) => {
                    tracing::warn!("skipping malformed office entry #{position}: {err}");
                }
            }
        }
        catalog.warn_unknown_prerequisites();
        Ok(catalog)
    }

    /// Load from a file. A missing file is not fatal and yields an empty catalogue.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json_str(&json),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    "office catalogue {} not found, continuing with no offices",
                    path.display()
                );
                Ok(Self::empty())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&OfficeDefinition> {
        self.index.get(id).map(|&i| &self.offices[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position in catalogue order, used as the final ordering tie-breaker.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OfficeDefinition> {
        self.offices.iter()
    }

    pub fn len(&self) -> usize {
        self.offices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offices.is_empty()
    }

    fn insert(&mut self, mut definition: OfficeDefinition) {
        definition.id = definition.id.trim().to_string();
        let id = definition.id.clone();

        if id.is_empty() {
            tracing::warn!("skipping office with empty id");
            return;
        }
        if self.index.contains_key(&id) {
            tracing::warn!("skipping duplicate office id `{id}`");
            return;
        }
        if definition.seats == 0 {
            tracing::warn!("skipping office `{id}`: seat count must be positive");
            return;
        }
        if definition.term_length_years == 0 {
            tracing::warn!("skipping office `{id}`: term length must be positive");
            return;
        }
        if definition.requires_plebeian && definition.requires_patrician {
            tracing::warn!("skipping office `{id}`: cannot require both classes");
            return;
        }
        if definition.prerequisites_all.contains(&id) || definition.prerequisites_any.contains(&id)
        {
            tracing::warn!("skipping office `{id}`: lists itself as a prerequisite");
            return;
        }
        if definition.name.trim().is_empty() {
            definition.name = id.clone();
        }

        self.index.insert(id, self.offices.len());
        self.offices.push(definition);
    }

    fn warn_unknown_prerequisites(&self) {
        for office in &self.offices {
            for prerequisite in office
                .prerequisites_all
                .iter()
                .chain(office.prerequisites_any.iter())
            {
                if !self.index.contains_key(prerequisite) {
                    tracing::warn!(
                        "office `{}` lists unknown prerequisite `{prerequisite}`",
                        office.id
                    );
                }
            }
        }
    }
}
