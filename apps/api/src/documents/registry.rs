use crate::documents::Draft;

/// Named collection of saved documents, addressed by identifier.
///
/// Entries keep insertion order, but nothing relies on position.
#[derive(Debug, Clone)]
pub struct Registry<D> {
    entries: Vec<D>,
}

impl<D> Default for Registry<D> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<D: Draft> Registry<D> {
    /// Builds a registry from persisted entries. Later duplicates of an
    /// identifier replace earlier ones.
    pub fn from_entries(entries: Vec<D>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            registry.upsert(entry);
        }
        registry
    }

    pub fn list(&self) -> &[D] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&D> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Removes any entry with the same identifier, then appends.
    pub fn upsert(&mut self, entry: D) {
        self.entries.retain(|e| e.id() != entry.id());
        self.entries.push(entry);
    }

    /// Returns `false` when no entry had this identifier.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
