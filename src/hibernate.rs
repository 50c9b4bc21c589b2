/// Hibernate and restore operations
use async_trait::async_trait;

use crate::error::{HibernateError, StoreError};
use crate::storage::KeyValueStore;
use crate::store::TabRecordStore;
use crate::tab_record::{LinkTarget, RecordRef, TabRecord, TabSnapshot};

/// The parts of the browser tabs API the extension uses.
/// Errors carry the browser's message as text.
#[async_trait(?Send)]
pub trait TabsApi {
    async fn get(&self, tab_id: i32) -> Result<TabSnapshot, String>;
    /// Active tab of the current window
    async fn query_active(&self) -> Result<Option<TabSnapshot>, String>;
    async fn create(&self, url: &str) -> Result<(), String>;
    async fn remove(&self, tab_id: i32) -> Result<(), String>;
}

pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Store a live tab and close it.
///
/// Nothing is stored when the tab cannot be resolved or the save fails.
/// If only the close fails the record stays in the list and the error
/// carries it.
pub async fn hibernate_tab<S, T, C>(
    store: &mut TabRecordStore<S>,
    tabs: &T,
    clock: &C,
    tab_id: i32,
) -> Result<TabRecord, HibernateError>
where
    S: KeyValueStore,
    T: TabsApi,
    C: Clock,
{
    let tab = tabs.get(tab_id).await.map_err(|e| {
        log::warn!("Cannot resolve tab {}: {}", tab_id, e);
        HibernateError::TabNotFound(e)
    })?;
    hibernate_snapshot(store, tabs, clock, tab).await
}

/// Hibernate the active tab of the current window
pub async fn hibernate_current_tab<S, T, C>(
    store: &mut TabRecordStore<S>,
    tabs: &T,
    clock: &C,
) -> Result<TabRecord, HibernateError>
where
    S: KeyValueStore,
    T: TabsApi,
    C: Clock,
{
    let active = tabs
        .query_active()
        .await
        .map_err(HibernateError::Browser)?
        .ok_or(HibernateError::NoActiveTab)?;

    hibernate_tab(store, tabs, clock, active.id).await
}

async fn hibernate_snapshot<S, T, C>(
    store: &mut TabRecordStore<S>,
    tabs: &T,
    clock: &C,
    tab: TabSnapshot,
) -> Result<TabRecord, HibernateError>
where
    S: KeyValueStore,
    T: TabsApi,
    C: Clock,
{
    let record = TabRecord::new(
        tab.url,
        tab.title,
        tab.fav_icon_url.unwrap_or_default(),
        clock.now_ms(),
    );
    store.append(record.clone()).await?;

    match tabs.remove(tab.id).await {
        Ok(()) => {
            log::info!("Hibernated tab {}: {}", tab.id, record.url);
            Ok(record)
        }
        Err(reason) => {
            log::warn!("Stored {} but could not close tab {}: {}", record.url, tab.id, reason);
            Err(HibernateError::CloseFailed {
                record: Box::new(record),
                reason,
            })
        }
    }
}

/// Store a hyperlink without opening or closing anything
pub async fn hibernate_link<S, C>(
    store: &mut TabRecordStore<S>,
    clock: &C,
    link: LinkTarget,
) -> Result<TabRecord, HibernateError>
where
    S: KeyValueStore,
    C: Clock,
{
    let title = match link.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => link.url.clone(),
    };
    let record = TabRecord::new(
        link.url,
        title,
        link.fav_icon_url.unwrap_or_default(),
        clock.now_ms(),
    );
    store.append(record.clone()).await?;

    log::info!("Hibernated link: {}", record.url);
    Ok(record)
}

/// Take a record out of the list and open its URL in a new tab.
///
/// If the tab cannot be opened the record goes back where it was.
pub async fn restore<S, T>(
    store: &mut TabRecordStore<S>,
    tabs: &T,
    target: &RecordRef,
) -> Result<TabRecord, HibernateError>
where
    S: KeyValueStore,
    T: TabsApi,
{
    let (position, record) = store.remove(target).await?;

    if let Err(reason) = tabs.create(&record.url).await {
        log::warn!("Could not reopen {}: {}", record.url, reason);
        if let Err(e) = store.insert_at(position, record.clone()).await {
            log::error!("Lost record {} after failed restore: {}", record.url, e);
        }
        return Err(HibernateError::OpenFailed(reason));
    }

    log::info!("Restored tab: {}", record.url);
    Ok(record)
}

/// Drop a record without reopening it
pub async fn discard<S: KeyValueStore>(
    store: &mut TabRecordStore<S>,
    target: &RecordRef,
) -> Result<TabRecord, StoreError> {
    let (_, record) = store.remove(target).await?;
    log::info!("Removed inactive tab: {}", record.url);
    Ok(record)
}
