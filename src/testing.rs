/// Test doubles for the storage and tabs bridges
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PersistenceError;
use crate::hibernate::{Clock, TabsApi};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::tab_record::{TabRecord, TabSnapshot};

pub fn record(url: &str, timestamp: u64) -> TabRecord {
    TabRecord::new(url.to_string(), format!("Title of {}", url), String::new(), timestamp)
}

pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// Memory store whose reads and writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

#[async_trait(?Send)]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        if self.fail_reads.get() {
            return Err(PersistenceError::Io("read failed".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::Io("QuotaExceededError".to_string()));
        }
        self.inner.set(key, value).await
    }
}

/// Browser window stand-in: open tabs by id, plus switches to break calls
#[derive(Default)]
pub struct FakeTabs {
    pub open: RefCell<HashMap<i32, TabSnapshot>>,
    pub active: Cell<Option<i32>>,
    pub created: RefCell<Vec<String>>,
    pub fail_remove: Cell<bool>,
    pub fail_create: Cell<bool>,
    next_id: Cell<i32>,
}

impl FakeTabs {
    pub fn new() -> Self {
        FakeTabs {
            next_id: Cell::new(100),
            ..Default::default()
        }
    }

    pub fn open_tab(&self, id: i32, url: &str, title: &str, favicon: Option<&str>) {
        self.open.borrow_mut().insert(
            id,
            TabSnapshot {
                id,
                url: url.to_string(),
                title: title.to_string(),
                fav_icon_url: favicon.map(|f| f.to_string()),
            },
        );
    }

    pub fn is_open(&self, id: i32) -> bool {
        self.open.borrow().contains_key(&id)
    }
}

#[async_trait(?Send)]
impl TabsApi for FakeTabs {
    async fn get(&self, tab_id: i32) -> Result<TabSnapshot, String> {
        self.open
            .borrow()
            .get(&tab_id)
            .cloned()
            .ok_or_else(|| format!("Invalid tab ID: {}", tab_id))
    }

    async fn query_active(&self) -> Result<Option<TabSnapshot>, String> {
        Ok(self.active.get().and_then(|id| self.open.borrow().get(&id).cloned()))
    }

    async fn create(&self, url: &str) -> Result<(), String> {
        if self.fail_create.get() {
            return Err("Illegal URL".to_string());
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.created.borrow_mut().push(url.to_string());
        self.open_tab(id, url, "", None);
        Ok(())
    }

    async fn remove(&self, tab_id: i32) -> Result<(), String> {
        if self.fail_remove.get() {
            return Err("Tab is being dragged".to_string());
        }
        self.open
            .borrow_mut()
            .remove(&tab_id)
            .map(|_| ())
            .ok_or_else(|| format!("Invalid tab ID: {}", tab_id))
    }
}

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}
