use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::models::Florist;

/// Errors that can occur when loading or querying the florist dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset format: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate florist id {0}")]
    DuplicateId(u32),

    #[error("Florist {0} not found")]
    NotFound(u32),
}

/// Static florist reference data, loaded once at start-up
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    florists: Vec<Florist>,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate ids
    ///
    /// Any `distance` carried in the source is dropped; distances only exist
    /// relative to a search location.
    pub fn from_florists(florists: Vec<Florist>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(florists.len());
        let mut normalized = Vec::with_capacity(florists.len());

        for mut florist in florists {
            if !seen.insert(florist.id) {
                return Err(DatasetError::DuplicateId(florist.id));
            }
            florist.distance = None;
            normalized.push(florist);
        }

        Ok(Self { florists: normalized })
    }

    /// Parse a JSON array of florist records
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let florists: Vec<Florist> = serde_json::from_str(json)?;
        Self::from_florists(florists)
    }

    /// Load the dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&json)?;

        tracing::info!("Loaded {} florists from {}", dataset.len(), path.display());

        Ok(dataset)
    }

    /// All florists in dataset order
    pub fn florists(&self) -> &[Florist] {
        &self.florists
    }

    pub fn find(&self, id: u32) -> Option<&Florist> {
        self.florists.iter().find(|f| f.id == id)
    }

    /// Detail lookup; an unknown id is an error, never a placeholder record
    pub fn get(&self, id: u32) -> Result<&Florist, DatasetError> {
        self.find(id).ok_or(DatasetError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.florists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.florists.is_empty()
    }
}
