//! Phenotype vocabulary: raw diagnosis codes to phenotype groupings
//!
//! The vocabulary is a static lookup resource loaded once per run and passed
//! explicitly to the components that need it. Each (system, code) pair maps
//! to at most one phenotype grouping per vocabulary version.

use crate::error::{PhewasError, Result};
use crate::models::CodeSystem;
use rustc_hash::{FxHashMap, FxHashSet};

/// Index of a phenotype within a vocabulary
pub type PhenotypeIndex = usize;

/// Immutable code-to-phenotype lookup table
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Coding systems this vocabulary version covers
    supported: FxHashSet<CodeSystem>,
    /// (system, code) → phenotype index
    lookup: FxHashMap<(CodeSystem, String), PhenotypeIndex>,
    /// Phenotype identifiers, indexed by `PhenotypeIndex`
    phenotype_ids: Vec<String>,
    /// Reverse index from phenotype id to its position
    phenotype_index: FxHashMap<String, PhenotypeIndex>,
}

impl Vocabulary {
    /// Build a vocabulary from (system, code, phenotype id) entries
    ///
    /// The supported-systems set declares which coding systems this
    /// vocabulary version covers; entries outside it are rejected. Two
    /// entries for the same (system, code) must agree on the target
    /// phenotype, otherwise the table is inconsistent and the build fails.
    pub fn from_entries<I, S>(supported: &[CodeSystem], entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (CodeSystem, S, S)>,
        S: Into<String>,
    {
        let supported: FxHashSet<CodeSystem> = supported.iter().copied().collect();
        let mut lookup = FxHashMap::default();
        let mut phenotype_ids: Vec<String> = Vec::new();
        let mut phenotype_index: FxHashMap<String, PhenotypeIndex> = FxHashMap::default();

        for (system, code, phenotype) in entries {
            let code = code.into();
            let phenotype = phenotype.into();

            if !supported.contains(&system) {
                return Err(PhewasError::Vocabulary(format!(
                    "entry {code} uses {system}, which is not in the supported set"
                )));
            }

            let idx = match phenotype_index.get(&phenotype) {
                Some(&idx) => idx,
                None => {
                    let idx = phenotype_ids.len();
                    phenotype_ids.push(phenotype.clone());
                    phenotype_index.insert(phenotype, idx);
                    idx
                }
            };

            if let Some(&existing) = lookup.get(&(system, code.clone())) {
                if existing != idx {
                    return Err(PhewasError::Vocabulary(format!(
                        "code {code} ({system}) maps to both {} and {}",
                        phenotype_ids[existing], phenotype_ids[idx]
                    )));
                }
            } else {
                lookup.insert((system, code), idx);
            }
        }

        Ok(Self {
            supported,
            lookup,
            phenotype_ids,
            phenotype_index,
        })
    }

    /// Map a raw code to its phenotype index
    ///
    /// Returns `Ok(None)` for codes the vocabulary does not map (a valid
    /// outcome, counted by the caller), and `UnknownCodeKind` only when the
    /// coding system itself is unsupported.
    pub fn map(&self, system: CodeSystem, code: &str) -> Result<Option<PhenotypeIndex>> {
        if !self.supported.contains(&system) {
            return Err(PhewasError::UnknownCodeKind(system.to_string()));
        }
        Ok(self.lookup.get(&(system, code.to_string())).copied())
    }

    /// Number of phenotypes in the vocabulary
    #[must_use]
    pub fn n_phenotypes(&self) -> usize {
        self.phenotype_ids.len()
    }

    /// Phenotype identifier for a given index
    #[must_use]
    pub fn phenotype_id(&self, idx: PhenotypeIndex) -> &str {
        &self.phenotype_ids[idx]
    }

    /// Look up the index of a phenotype identifier
    #[must_use]
    pub fn index_of(&self, phenotype_id: &str) -> Option<PhenotypeIndex> {
        self.phenotype_index.get(phenotype_id).copied()
    }

    /// All phenotype identifiers in index order
    #[must_use]
    pub fn phenotype_ids(&self) -> &[String] {
        &self.phenotype_ids
    }
}
