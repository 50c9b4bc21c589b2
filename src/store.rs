/// The in-memory list of hibernated tabs, kept in step with storage
///
/// Every mutation is write-through: the full list is saved before the
/// mutation counts as committed. When the save fails the list is put back
/// the way it was and the caller gets the persistence error.

use crate::error::{PersistenceError, StoreError};
use crate::storage::{InactiveTabStorage, KeyValueStore};
use crate::tab_record::{RecordRef, TabRecord};

pub struct TabRecordStore<S> {
    storage: InactiveTabStorage<S>,
    records: Vec<TabRecord>,
    loaded: bool,
}

impl<S: KeyValueStore> TabRecordStore<S> {
    /// Starts empty; the stored list is read on first use
    pub fn new(storage: InactiveTabStorage<S>) -> Self {
        TabRecordStore {
            storage,
            records: Vec::new(),
            loaded: false,
        }
    }

    pub fn storage(&self) -> &InactiveTabStorage<S> {
        &self.storage
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Load from storage once. A failed load leaves the store unloaded so
    /// the next call tries again.
    pub async fn ensure_loaded(&mut self) -> Result<(), StoreError> {
        if self.loaded {
            return Ok(());
        }

        let records = self.storage.load().await.map_err(|e| {
            log::error!("Failed to load inactive tabs: {}", e);
            e
        })?;
        log::info!("Loaded {} inactive tabs", records.len());

        self.records = records;
        self.loaded = true;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of the list in hibernation order
    pub fn get_all(&self) -> Vec<TabRecord> {
        self.records.clone()
    }

    pub fn get_at(&self, index: i64) -> Result<&TabRecord, StoreError> {
        let position = self.checked_index(index)?;
        Ok(&self.records[position])
    }

    pub fn get(&self, id: &str) -> Result<&TabRecord, StoreError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Resolve a reference to its current position in the list
    pub fn position(&self, target: &RecordRef) -> Result<usize, StoreError> {
        match target {
            RecordRef::Index(index) => self.checked_index(*index),
            RecordRef::Id(id) => self
                .records
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone())),
        }
    }

    fn checked_index(&self, index: i64) -> Result<usize, StoreError> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.records.len())
            .ok_or(StoreError::OutOfRange {
                index,
                len: self.records.len(),
            })
    }

    /// Add at the end. Duplicate URLs are allowed.
    pub async fn append(&mut self, record: TabRecord) -> Result<(), StoreError> {
        self.ensure_loaded().await?;

        self.records.push(record);
        if let Err(e) = self.commit().await {
            self.records.pop();
            return Err(e.into());
        }
        Ok(())
    }

    /// Insert at `index`, clamped to the end of the list
    pub async fn insert_at(&mut self, index: usize, record: TabRecord) -> Result<(), StoreError> {
        self.ensure_loaded().await?;

        let index = index.min(self.records.len());
        self.records.insert(index, record);
        if let Err(e) = self.commit().await {
            self.records.remove(index);
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn remove_at(&mut self, index: i64) -> Result<TabRecord, StoreError> {
        self.ensure_loaded().await?;

        let position = self.checked_index(index)?;
        self.remove_position(position).await
    }

    /// Remove the referenced record, returning where it was and what it was
    pub async fn remove(&mut self, target: &RecordRef) -> Result<(usize, TabRecord), StoreError> {
        self.ensure_loaded().await?;

        let position = self.position(target)?;
        let record = self.remove_position(position).await?;
        Ok((position, record))
    }

    async fn remove_position(&mut self, position: usize) -> Result<TabRecord, StoreError> {
        let record = self.records.remove(position);
        if let Err(e) = self.commit().await {
            self.records.insert(position, record);
            return Err(e.into());
        }
        Ok(record)
    }

    /// Drop every record (fresh install)
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        let previous = std::mem::take(&mut self.records);
        if let Err(e) = self.commit().await {
            self.records = previous;
            return Err(e.into());
        }
        self.loaded = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), PersistenceError> {
        self.storage.save(&self.records).await.map_err(|e| {
            log::error!("Failed to save inactive tabs: {}", e);
            e
        })
    }
}
