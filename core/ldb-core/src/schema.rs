//! Table definitions as supplied by the host.
//!
//! The host owns the table definition; this module only describes the parts
//! the adapter needs: the fixed record length and the declared indexes.
//! Only one shape is accepted: a single unique index over a single column.

use crate::engine::descriptor::{MAX_KEY_LENGTH, MAX_RECORD_LENGTH};
use crate::error::{LdbError, LdbResult};

/// Storage class of a key column inside the row buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Fixed-length binary data
    Binary,
    /// Fixed-length text
    Text,
    /// Fixed-width integer
    Integer,
    /// Variable-length text with a 1-byte length prefix
    VarText1,
    /// Variable-length binary with a 1-byte length prefix
    VarBinary1,
    /// Variable-length text with a 2-byte length prefix
    VarText2,
    /// Variable-length binary with a 2-byte length prefix
    VarBinary2,
}

impl KeyType {
    /// Length-prefix bytes preceding the column data inside a row.
    pub fn length_prefix(self) -> usize {
        match self {
            KeyType::VarText1 | KeyType::VarBinary1 => 1,
            KeyType::VarText2 | KeyType::VarBinary2 => 2,
            KeyType::Binary | KeyType::Text | KeyType::Integer => 0,
        }
    }

    pub fn is_var_length(self) -> bool {
        self.length_prefix() > 0
    }
}

/// One column of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub column: String,
    /// Byte offset of the column inside the row buffer (prefix included)
    pub offset: usize,
    /// Data length in bytes (prefix excluded)
    pub length: usize,
    pub key_type: KeyType,
}

impl KeyPart {
    pub fn new(column: impl Into<String>, offset: usize, length: usize, key_type: KeyType) -> Self {
        Self {
            column: column.into(),
            offset,
            length,
            key_type,
        }
    }

    /// Row bytes occupied by this column, prefix included.
    pub fn span(&self) -> usize {
        self.key_type.length_prefix() + self.length
    }
}

/// Index declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub parts: Vec<KeyPart>,
    pub unique: bool,
}

impl IndexDef {
    pub fn new(name: impl Into<String>, parts: Vec<KeyPart>, unique: bool) -> Self {
        Self {
            name: name.into(),
            parts,
            unique,
        }
    }

    /// Unique index over one column.
    pub fn unique(name: impl Into<String>, part: KeyPart) -> Self {
        Self::new(name, vec![part], true)
    }
}

/// Fixed-layout table definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Length of every row buffer
    pub record_length: usize,
    pub indexes: Vec<IndexDef>,
}

impl TableSchema {
    pub fn new(record_length: usize) -> Self {
        Self {
            record_length,
            indexes: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Schema with one unique single-column key, the only accepted shape.
    pub fn single_key(record_length: usize, part: KeyPart) -> Self {
        Self::new(record_length).with_index(IndexDef::unique("PRIMARY", part))
    }

    /// Key parts across all indexes.
    pub fn key_part_count(&self) -> usize {
        self.indexes.iter().map(|index| index.parts.len()).sum()
    }

    /// Indexes declared unique.
    pub fn unique_count(&self) -> usize {
        self.indexes.iter().filter(|index| index.unique).count()
    }

    /// Reject every shape other than one unique single-column key that fits the row.
    pub fn validate(&self) -> LdbResult<()> {
        let parts = self.key_part_count();
        if parts != 1 {
            return Err(LdbError::Configuration(format!(
                "exactly one key part required, found {parts}"
            )));
        }
        let uniques = self.unique_count();
        if uniques != 1 {
            return Err(LdbError::Configuration(format!(
                "exactly one unique constraint required, found {uniques}"
            )));
        }
        if self.record_length == 0 || self.record_length > MAX_RECORD_LENGTH {
            return Err(LdbError::Configuration(format!(
                "record length {} outside 1..={MAX_RECORD_LENGTH}",
                self.record_length
            )));
        }

        let part = self.key_part()?;
        if part.length == 0 || part.length > MAX_KEY_LENGTH {
            return Err(LdbError::Configuration(format!(
                "key column '{}' length {} outside 1..={MAX_KEY_LENGTH}",
                part.column, part.length
            )));
        }
        let end = part.offset.checked_add(part.span()).ok_or_else(|| {
            LdbError::Configuration(format!(
                "key column '{}' offset {} overflows the row",
                part.column, part.offset
            ))
        })?;
        if end > self.record_length {
            return Err(LdbError::Configuration(format!(
                "key column '{}' ends at byte {end} past record length {}",
                part.column, self.record_length
            )));
        }
        Ok(())
    }

    /// First key part of the first index.
    pub fn key_part(&self) -> LdbResult<&KeyPart> {
        self.indexes
            .first()
            .and_then(|index| index.parts.first())
            .ok_or_else(|| LdbError::Configuration("table declares no key".to_string()))
    }
}
