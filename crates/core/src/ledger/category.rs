//! Ledger category alias normalization.
//!
//! Older rows and clients use role-flavored names for the same ledgers
//! (`adviser_maintenance`, `treasurer_events`). Names are normalized here, at
//! the boundary, and only [`LedgerCategory`] travels further in.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};

use super::types::LedgerCategory;

/// Built-in aliases, alias name to canonical category.
const BUILTIN_ALIASES: [(&str, LedgerCategory); 5] = [
    ("maintenance", LedgerCategory::Maintenance),
    ("adviser_maintenance", LedgerCategory::Maintenance),
    ("fines", LedgerCategory::Fines),
    ("treasurer_events", LedgerCategory::Contributions),
    ("events", LedgerCategory::Contributions),
];

/// Maps ledger names, canonical or alias, onto [`LedgerCategory`].
#[derive(Debug, Clone)]
pub struct CategoryAliases {
    aliases: HashMap<String, LedgerCategory>,
}

impl Default for CategoryAliases {
    fn default() -> Self {
        let mut aliases: HashMap<String, LedgerCategory> = LedgerCategory::ALL
            .into_iter()
            .map(|category| (category.as_str().to_string(), category))
            .collect();
        for (alias, category) in BUILTIN_ALIASES {
            aliases.insert(alias.to_string(), category);
        }
        Self { aliases }
    }
}

impl CategoryAliases {
    /// Builds the table from the built-ins plus configured extras.
    ///
    /// Extra entries map an alias to a canonical name (or to another known alias).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` when an extra alias targets an unknown ledger.
    pub fn with_extra<'a, I>(extra: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut table = Self::default();
        for (alias, target) in extra {
            let category = table.normalize(target).map_err(|_| {
                EngineError::invalid(format!(
                    "category alias '{alias}' points at unknown ledger '{target}'"
                ))
            })?;
            table.aliases.insert(alias.trim().to_ascii_lowercase(), category);
        }
        Ok(table)
    }

    /// Normalizes a ledger name.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` for unknown names.
    pub fn normalize(&self, name: &str) -> EngineResult<LedgerCategory> {
        let key = name.trim().to_ascii_lowercase();
        self.aliases
            .get(&key)
            .copied()
            .ok_or_else(|| EngineError::invalid(format!("unknown ledger category '{name}'")))
    }

    /// Every stored name that normalizes to `category`, canonical name first.
    #[must_use]
    pub fn names_for(&self, category: LedgerCategory) -> Vec<String> {
        let mut names: Vec<String> = self
            .aliases
            .iter()
            .filter(|(name, target)| **target == category && name.as_str() != category.as_str())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names.insert(0, category.as_str().to_string());
        names
    }
}
