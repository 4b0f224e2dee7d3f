//! # Static Source
//!
//! Where static GTFS tables come from. Tables are handed over as raw bytes
//! keyed by category and file name; decoding is left to the parser.
//! Fetching and unpacking archives happens elsewhere.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use realtime::Category;

use crate::table::TableKind;

/// Supplies the raw contents of static tables.
#[async_trait]
pub trait StaticSource: Send + Sync {
    /// Raw bytes of a table, or `None` when the category has no such table.
    async fn read_table(&self, category: &Category, table: TableKind) -> Result<Option<Vec<u8>>>;
}

#[async_trait]
impl<T: StaticSource + ?Sized> StaticSource for Arc<T> {
    async fn read_table(&self, category: &Category, table: TableKind) -> Result<Option<Vec<u8>>> {
        (**self).read_table(category, table).await
    }
}

/// Reads tables from `<root>/<category dir>/<file name>`.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of a category's table.
    #[must_use]
    pub fn path(&self, category: &Category, table: TableKind) -> PathBuf {
        self.root.join(category.dir_name()).join(table.file_name())
    }
}

#[async_trait]
impl StaticSource for DirectorySource {
    async fn read_table(&self, category: &Category, table: TableKind) -> Result<Option<Vec<u8>>> {
        let path = self.path(category, table);
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}
