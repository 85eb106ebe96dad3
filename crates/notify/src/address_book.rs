//! Assignee address book.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

/// Reserved key holding the sender address.
pub const SENDER_KEY: &str = "SENDER_MAIL";

/// Errors loading an address book.
#[derive(Debug, thiserror::Error)]
pub enum AddressBookError {
    /// File could not be read
    #[error("cannot read address book {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not a flat name-to-address mapping
    #[error("invalid address book: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Mapping from assignee name to email address, plus the sender address
/// under [`SENDER_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    entries: HashMap<String, String>,
}

impl AddressBook {
    /// Load a YAML address book from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AddressBookError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| AddressBookError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let book = Self::from_yaml(&contents)?;
        info!("Loaded {} address book entries from {}", book.len(), path.display());
        Ok(book)
    }

    /// Parse a YAML mapping. An empty document is an empty book.
    pub fn from_yaml(yaml: &str) -> Result<Self, AddressBookError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build a book from name/address pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Sender address, empty when not configured.
    pub fn sender(&self) -> &str {
        self.lookup(SENDER_KEY)
    }

    /// Address of an assignee, empty when unknown.
    pub fn lookup(&self, name: &str) -> &str {
        self.entries.get(name).map(String::as_str).unwrap_or("")
    }

    /// Whether the book has an entry for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries, sender included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SENDER_MAIL: digest@example.com").unwrap();
        writeln!(file, "alice: alice@example.com").unwrap();
        writeln!(file, "\"bob smith\": bob@example.com").unwrap();

        let book = AddressBook::load(file.path()).unwrap();

        assert_eq!(book.len(), 3);
        assert_eq!(book.sender(), "digest@example.com");
        assert_eq!(book.lookup("alice"), "alice@example.com");
        assert_eq!(book.lookup("bob smith"), "bob@example.com");
    }

    #[test]
    fn test_missing_entries_are_empty() {
        let book = AddressBook::from_entries([("alice", "alice@example.com")]);
        assert_eq!(book.sender(), "");
        assert_eq!(book.lookup("carol"), "");
        assert!(!book.contains("carol"));
    }

    #[test]
    fn test_empty_document() {
        assert!(AddressBook::from_yaml("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_nested_yaml() {
        let err = AddressBook::from_yaml("alice:\n  - a@example.com\n").unwrap_err();
        assert!(matches!(err, AddressBookError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = AddressBook::load("/nonexistent/AssigneesEmail.yaml").unwrap_err();
        assert!(matches!(err, AddressBookError::Io { .. }));
    }
}
