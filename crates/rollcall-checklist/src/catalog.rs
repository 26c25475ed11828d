//! Event catalog: the fixed code → activity mapping, grouped into display rows.

use rollcall_core::config::{CatalogEntryConfig, ChecklistConfig};
use rollcall_core::error::{Result, RollcallError};
use serde::Serialize;
use std::collections::HashSet;

use crate::codec::{self, RESERVED};

/// One trackable activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub code: char,
    pub name: String,
    pub record_name: String,
}

/// Validated catalog. Codes are unique across all rows and never collide with
/// the postback envelope delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCatalog {
    rows: Vec<Vec<CatalogEntry>>,
}

impl EventCatalog {
    pub fn from_config(config: &ChecklistConfig) -> Result<Self> {
        Self::from_rows(&config.rows)
    }

    pub fn from_rows(rows: &[Vec<CatalogEntryConfig>]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut built = Vec::with_capacity(rows.len());

        for row in rows {
            let mut entries = Vec::with_capacity(row.len());
            for entry in row {
                if RESERVED.contains(&entry.code) || entry.code.is_whitespace() {
                    return Err(RollcallError::Config(format!(
                        "Event code {:?} is reserved and cannot be used",
                        entry.code
                    )));
                }
                if !seen.insert(entry.code) {
                    return Err(RollcallError::Config(format!(
                        "Duplicate event code {:?} in checklist rows",
                        entry.code
                    )));
                }
                entries.push(CatalogEntry {
                    code: entry.code,
                    name: entry.name.clone(),
                    record_name: entry
                        .record_name
                        .clone()
                        .unwrap_or_else(|| entry.name.clone()),
                });
            }
            if !entries.is_empty() {
                built.push(entries);
            }
        }

        Ok(Self { rows: built })
    }

    pub fn rows(&self) -> &[Vec<CatalogEntry>] {
        &self.rows
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.rows.iter().flatten()
    }

    pub fn contains(&self, code: char) -> bool {
        self.entry(code).is_some()
    }

    pub fn entry(&self, code: char) -> Option<&CatalogEntry> {
        self.entries().find(|e| e.code == code)
    }

    /// Catalog codes present in `token`, first occurrence order, duplicates
    /// and unknown codes dropped.
    pub fn checked(&self, token: &str) -> Vec<&CatalogEntry> {
        let mut seen = HashSet::new();
        codec::decode(token)
            .into_iter()
            .filter(|c| seen.insert(*c))
            .filter_map(|c| self.entry(c))
            .collect()
    }

    /// Rebuild a token from only the catalog codes it contains.
    pub fn normalize(&self, token: &str) -> String {
        let codes: Vec<char> = self.checked(token).iter().map(|e| e.code).collect();
        codec::encode(&codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: char, name: &str) -> CatalogEntryConfig {
        CatalogEntryConfig {
            code,
            name: name.into(),
            record_name: None,
        }
    }

    #[test]
    fn test_default_catalog() {
        let catalog = EventCatalog::from_config(&ChecklistConfig::default()).unwrap();
        assert_eq!(catalog.rows().len(), 4);
        assert_eq!(catalog.entries().count(), 10);
        assert_eq!(catalog.entry('C').unwrap().record_name, "主日聚會");
        assert_eq!(catalog.entry('D').unwrap().record_name, "禱告聚會");
        assert!(!catalog.contains('Z'));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let rows = vec![vec![entry('C', "a")], vec![entry('C', "b")]];
        assert!(EventCatalog::from_rows(&rows).is_err());
    }

    #[test]
    fn test_reserved_code_rejected() {
        assert!(EventCatalog::from_rows(&[vec![entry(':', "colon")]]).is_err());
        assert!(EventCatalog::from_rows(&[vec![entry('&', "amp")]]).is_err());
        assert!(EventCatalog::from_rows(&[vec![entry(' ', "space")]]).is_err());
    }

    #[test]
    fn test_checked_dedups_and_filters() {
        let catalog = EventCatalog::from_config(&ChecklistConfig::default()).unwrap();
        let names: Vec<&str> = catalog
            .checked("DCxDC")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["禱告聚會", "主日"]);
        assert_eq!(catalog.normalize("DCxDC"), "DC");
        assert_eq!(catalog.normalize(""), "");
    }

    #[test]
    fn test_normalized_token_decodes_to_checked_codes() {
        let catalog = EventCatalog::from_config(&ChecklistConfig::default()).unwrap();
        let token = catalog.normalize("HZ:CH");
        let codes: Vec<char> = catalog.checked("HZ:CH").iter().map(|e| e.code).collect();
        assert_eq!(codec::decode(&token), codes);
        assert_eq!(token, codec::encode(&['H', 'C']));
    }
}
