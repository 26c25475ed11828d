//! Participant roster and the spreadsheet row layout for a submitted token.

use rollcall_core::config::SheetConfig;
use rollcall_core::error::{Result, RollcallError};
use std::collections::BTreeMap;

use crate::codec;

/// A resolved row write: A1 range plus one checkbox per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWrite {
    pub row: u32,
    pub range: String,
    pub values: Vec<bool>,
}

/// Maps participant names to sheet rows and tokens to checkbox vectors.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    worksheet: String,
    columns: Vec<char>,
    roster: BTreeMap<String, u32>,
}

impl SheetLayout {
    pub fn from_config(config: &SheetConfig) -> Result<Self> {
        let columns: Vec<char> = config.columns.chars().collect();
        if columns.is_empty() {
            return Err(RollcallError::Config("sheet.columns must not be empty".into()));
        }
        if let Some(bad) = columns.iter().find(|c| !c.is_ascii_uppercase()) {
            return Err(RollcallError::Config(format!(
                "sheet.columns must be spreadsheet column letters, got {bad:?}"
            )));
        }
        // One block write covers first..=last, so the letters must be a run.
        if let Some(pair) = columns.windows(2).find(|w| w[1] as u32 != w[0] as u32 + 1) {
            return Err(RollcallError::Config(format!(
                "sheet.columns must be consecutive ascending letters, got {:?} after {:?}",
                pair[1], pair[0]
            )));
        }
        Ok(Self {
            worksheet: config.worksheet.clone(),
            columns,
            roster: config.roster.clone(),
        })
    }

    /// Whether `code` has a checkbox column.
    pub fn has_column(&self, code: char) -> bool {
        self.columns.contains(&code)
    }

    pub fn row_for(&self, name: &str) -> Option<u32> {
        self.roster.get(name).copied()
    }

    /// `true` for each column whose code is a member of the token.
    pub fn checkbox_values(&self, token: &str) -> Vec<bool> {
        let codes = codec::decode(token);
        self.columns.iter().map(|c| codes.contains(c)).collect()
    }

    /// A1 range covering the checkbox columns of one row.
    pub fn range(&self, row: u32) -> String {
        let first = self.columns[0];
        let last = self.columns[self.columns.len() - 1];
        format!(
            "'{}'!{first}{row}:{last}{row}",
            self.worksheet.replace('\'', "''")
        )
    }

    /// Resolve a participant's row write. `None` means the name has no row.
    pub fn row_write(&self, name: &str, token: &str) -> Option<RowWrite> {
        let row = self.row_for(name)?;
        Some(RowWrite {
            row,
            range: self.range(row),
            values: self.checkbox_values(token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SheetLayout {
        let mut config = SheetConfig {
            worksheet: "grace".into(),
            ..SheetConfig::default()
        };
        config.roster.insert("daniel".into(), 2);
        config.roster.insert("Grace Lee".into(), 26);
        SheetLayout::from_config(&config).unwrap()
    }

    #[test]
    fn test_checkbox_values_follow_column_order() {
        let values = layout().checkbox_values("HC");
        // C D E F G H I J K L
        assert_eq!(
            values,
            vec![true, false, false, false, false, true, false, false, false, false]
        );
    }

    #[test]
    fn test_duplicates_count_once() {
        assert_eq!(layout().checkbox_values("CC"), layout().checkbox_values("C"));
    }

    #[test]
    fn test_row_write() {
        let write = layout().row_write("Grace Lee", "CD").unwrap();
        assert_eq!(write.row, 26);
        assert_eq!(write.range, "'grace'!C26:L26");
        assert_eq!(write.values.iter().filter(|v| **v).count(), 2);
    }

    #[test]
    fn test_unknown_name_is_a_miss() {
        assert!(layout().row_write("stranger", "C").is_none());
    }

    #[test]
    fn test_quote_in_worksheet_name() {
        let config = SheetConfig {
            worksheet: "Dan's".into(),
            ..SheetConfig::default()
        };
        let layout = SheetLayout::from_config(&config).unwrap();
        assert_eq!(layout.range(3), "'Dan''s'!C3:L3");
    }

    #[test]
    fn test_bad_columns_rejected() {
        let config = SheetConfig {
            columns: "C:D".into(),
            ..SheetConfig::default()
        };
        assert!(SheetLayout::from_config(&config).is_err());
        let config = SheetConfig {
            columns: String::new(),
            ..SheetConfig::default()
        };
        assert!(SheetLayout::from_config(&config).is_err());
    }

    #[test]
    fn test_gapped_or_unordered_columns_rejected() {
        for columns in ["CEG", "DC", "CC"] {
            let config = SheetConfig {
                columns: columns.into(),
                ..SheetConfig::default()
            };
            assert!(
                SheetLayout::from_config(&config).is_err(),
                "{columns} should be rejected"
            );
        }
        let config = SheetConfig {
            columns: "EFG".into(),
            ..SheetConfig::default()
        };
        let layout = SheetLayout::from_config(&config).unwrap();
        assert_eq!(layout.range(3), "'attendance'!E3:G3");
        assert_eq!(layout.checkbox_values("G"), vec![false, false, true]);
        assert!(layout.has_column('F'));
        assert!(!layout.has_column('C'));
    }
}
