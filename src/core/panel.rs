use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::validation::MAX_CONTAMINANTS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PanelError {
    #[error("Contaminant panel is empty")]
    Empty,

    #[error("Too many contaminants: {count} exceeds panel capacity ({capacity})")]
    TooManyContaminants { count: usize, capacity: usize },

    #[error("Duplicate contaminant id: {0}")]
    DuplicateId(String),
}

/// A reference organism screened against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contaminant {
    /// Identifier printed in reports and file headers
    pub id: String,

    /// Number of k-mers in the contaminant reference
    pub reference_kmers: u64,
}

impl Contaminant {
    pub fn new(id: impl Into<String>, reference_kmers: u64) -> Self {
        Self {
            id: id.into(),
            reference_kmers,
        }
    }
}

/// Immutable, ordered list of contaminants.
///
/// The position of a contaminant in the panel is its index everywhere else:
/// hit vectors, membership bits, counters and report rows.
#[derive(Debug, Clone)]
pub struct Panel {
    contaminants: Vec<Contaminant>,
}

impl Panel {
    /// Build a panel limited to the default capacity
    ///
    /// # Errors
    ///
    /// Returns `PanelError` if the list is empty, exceeds [`MAX_CONTAMINANTS`],
    /// or repeats an id.
    pub fn new(contaminants: Vec<Contaminant>) -> Result<Self, PanelError> {
        Self::with_capacity_limit(contaminants, MAX_CONTAMINANTS)
    }

    /// Build a panel limited to `capacity` contaminants
    ///
    /// # Errors
    ///
    /// See [`Panel::new`].
    pub fn with_capacity_limit(
        contaminants: Vec<Contaminant>,
        capacity: usize,
    ) -> Result<Self, PanelError> {
        if contaminants.is_empty() {
            return Err(PanelError::Empty);
        }
        let capacity = capacity.min(MAX_CONTAMINANTS);
        if contaminants.len() > capacity {
            return Err(PanelError::TooManyContaminants {
                count: contaminants.len(),
                capacity,
            });
        }

        let mut seen = HashSet::new();
        for contaminant in &contaminants {
            if !seen.insert(contaminant.id.as_str()) {
                return Err(PanelError::DuplicateId(contaminant.id.clone()));
            }
        }

        Ok(Self { contaminants })
    }

    /// Number of contaminants (N)
    pub fn len(&self) -> usize {
        self.contaminants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contaminants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Contaminant> {
        self.contaminants.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contaminant> {
        self.contaminants.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.contaminants.iter().map(|c| c.id.as_str())
    }

    /// Reference k-mer total for a contaminant, zero for an unknown index
    pub fn reference_kmers(&self, index: usize) -> u64 {
        self.get(index).map_or(0, |c| c.reference_kmers)
    }

    /// Panel position of a contaminant id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.contaminants.iter().position(|c| c.id == id)
    }
}
