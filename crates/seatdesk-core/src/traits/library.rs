//! Library seat capacity lookup.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::LibraryId;

/// Read access to library capacity, owned by the library CRUD layer.
#[async_trait]
pub trait LibraryDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Total seats in the library, or `None` if the library is unknown.
    async fn seat_capacity(&self, library_id: LibraryId) -> AppResult<Option<u32>>;
}

/// A fixed capacity table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticLibraryDirectory {
    capacities: HashMap<LibraryId, u32>,
}

impl StaticLibraryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a library's capacity.
    pub fn with_library(mut self, library_id: LibraryId, total_seats: u32) -> Self {
        self.capacities.insert(library_id, total_seats);
        self
    }
}

#[async_trait]
impl LibraryDirectory for StaticLibraryDirectory {
    async fn seat_capacity(&self, library_id: LibraryId) -> AppResult<Option<u32>> {
        Ok(self.capacities.get(&library_id).copied())
    }
}
