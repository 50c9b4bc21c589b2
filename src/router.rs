/// Message protocol between the popup/context menus and the background page
use futures_util::lock::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RouterError;
use crate::hibernate::{self, Clock, TabsApi};
use crate::storage::KeyValueStore;
use crate::store::TabRecordStore;
use crate::tab_record::{LinkTarget, RecordRef, TabRecord};

/// A request, identified on the wire by its `action` field
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetInactiveTabs,
    AddTabToInactive,
    RestoreTab(RecordRef),
    RemoveInactiveTab(RecordRef),
    HibernateTab { tab_id: i32 },
    HibernateLink(LinkTarget),
}

impl Request {
    pub fn parse(message: &Value) -> Result<Request, RouterError> {
        let action = message
            .get("action")
            .and_then(Value::as_str)
            .ok_or(RouterError::UnknownAction)?;

        match action {
            "getInactiveTabs" => Ok(Request::GetInactiveTabs),
            "addTabToInactive" => Ok(Request::AddTabToInactive),
            "restoreTab" => Ok(Request::RestoreTab(record_ref(message)?)),
            "removeInactiveTab" => Ok(Request::RemoveInactiveTab(record_ref(message)?)),
            "hibernateTab" => {
                let tab_id = message
                    .get("tabId")
                    .and_then(as_integer)
                    .and_then(|id| i32::try_from(id).ok())
                    .ok_or_else(|| RouterError::Malformed("tabId must be a tab id".to_string()))?;
                Ok(Request::HibernateTab { tab_id })
            }
            "hibernateLink" => serde_json::from_value::<LinkTarget>(message.clone())
                .map(Request::HibernateLink)
                .map_err(|e| RouterError::Malformed(e.to_string())),
            _ => Err(RouterError::UnknownAction),
        }
    }

    /// Wire form, as sent by the popup
    pub fn to_message(&self) -> Value {
        use serde_json::json;

        fn with_target(action: &str, target: &RecordRef) -> Value {
            match target {
                RecordRef::Id(id) => json!({ "action": action, "id": id }),
                RecordRef::Index(index) => json!({ "action": action, "index": index }),
            }
        }

        match self {
            Request::GetInactiveTabs => json!({ "action": "getInactiveTabs" }),
            Request::AddTabToInactive => json!({ "action": "addTabToInactive" }),
            Request::RestoreTab(target) => with_target("restoreTab", target),
            Request::RemoveInactiveTab(target) => with_target("removeInactiveTab", target),
            Request::HibernateTab { tab_id } => json!({ "action": "hibernateTab", "tabId": tab_id }),
            Request::HibernateLink(link) => json!({
                "action": "hibernateLink",
                "url": link.url,
                "title": link.title,
                "favIconUrl": link.fav_icon_url,
            }),
        }
    }
}

/// `id` wins over `index` when both are present
fn record_ref(message: &Value) -> Result<RecordRef, RouterError> {
    if let Some(id) = message.get("id").and_then(Value::as_str) {
        return Ok(RecordRef::Id(id.to_string()));
    }

    match message.get("index") {
        Some(index) => as_integer(index)
            .map(RecordRef::Index)
            .ok_or_else(|| RouterError::Malformed("index must be an integer".to_string())),
        None => Err(RouterError::Malformed("missing id or index".to_string())),
    }
}

/// JS numbers can arrive as floats; accept those without a fraction
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}

/// Either the list itself or a success flag with an optional error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Tabs(Vec<TabRecord>),
    Status {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Response {
    pub fn ok() -> Response {
        Response::Status {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Response {
        Response::Status {
            success: false,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Tabs(_) => true,
            Response::Status { success, .. } => *success,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": e.to_string() })
        })
    }
}

/// Owns the record store and answers one request at a time
pub struct MessageRouter<S, T, C> {
    store: TabRecordStore<S>,
    tabs: T,
    clock: C,
}

impl<S, T, C> MessageRouter<S, T, C>
where
    S: KeyValueStore,
    T: TabsApi,
    C: Clock,
{
    pub fn new(store: TabRecordStore<S>, tabs: T, clock: C) -> Self {
        MessageRouter { store, tabs, clock }
    }

    pub fn store(&self) -> &TabRecordStore<S> {
        &self.store
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    /// Always answers; malformed or unknown messages get a failure response
    pub async fn handle(&mut self, message: &Value) -> Response {
        log::debug!("Received message: {}", message);

        match Request::parse(message) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                log::warn!("Rejected message {}: {}", message, e);
                Response::failure(e)
            }
        }
    }

    pub async fn dispatch(&mut self, request: Request) -> Response {
        match self.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Request failed: {}", e);
                Response::failure(e)
            }
        }
    }

    async fn execute(&mut self, request: Request) -> Result<Response, RouterError> {
        self.store.ensure_loaded().await?;

        match request {
            Request::GetInactiveTabs => Ok(Response::Tabs(self.store.get_all())),
            Request::AddTabToInactive => {
                hibernate::hibernate_current_tab(&mut self.store, &self.tabs, &self.clock).await?;
                Ok(Response::ok())
            }
            Request::HibernateTab { tab_id } => {
                hibernate::hibernate_tab(&mut self.store, &self.tabs, &self.clock, tab_id).await?;
                Ok(Response::ok())
            }
            Request::HibernateLink(link) => {
                hibernate::hibernate_link(&mut self.store, &self.clock, link).await?;
                Ok(Response::ok())
            }
            Request::RestoreTab(target) => {
                hibernate::restore(&mut self.store, &self.tabs, &target).await?;
                Ok(Response::ok())
            }
            Request::RemoveInactiveTab(target) => {
                hibernate::discard(&mut self.store, &target).await?;
                Ok(Response::ok())
            }
        }
    }

    /// Empty the list; used when the extension is freshly installed
    pub async fn reset(&mut self) -> Result<(), RouterError> {
        self.store.clear().await?;
        log::info!("Inactive tab list reset");
        Ok(())
    }
}

/// Run one message through a shared router. Holding the lock for the whole
/// request keeps requests from interleaving at their await points.
pub async fn handle_serialized<S, T, C>(router: &Mutex<MessageRouter<S, T, C>>, message: Value) -> Value
where
    S: KeyValueStore,
    T: TabsApi,
    C: Clock,
{
    let mut router = router.lock().await;
    router.handle(&message).await.to_json()
}
