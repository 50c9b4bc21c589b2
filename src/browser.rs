/// Background page wiring: browser API bridges and event listeners
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::lock::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::config::HibernateConfig;
use crate::error::PersistenceError;
use crate::hibernate::{SystemClock, TabsApi};
use crate::router::{MessageRouter, Request, handle_serialized};
use crate::storage::{InactiveTabStorage, KeyValueStore};
use crate::store::TabRecordStore;
use crate::tab_record::{LinkTarget, TabSnapshot};

pub const HIBERNATE_TAB_MENU: &str = "hibernate-tab";
pub const HIBERNATE_LINK_MENU: &str = "hibernate-link";

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    fn onMessage(handler: &Closure<dyn FnMut(JsValue) -> js_sys::Promise>);

    fn registerContextMenus(tab_menu_id: &str, link_menu_id: &str, handler: &Closure<dyn FnMut(JsValue)>);

    fn onInstalled(handler: &Closure<dyn FnMut(String)>);
}

/// browser.tabs
pub struct BrowserTabs;

#[async_trait(?Send)]
impl TabsApi for BrowserTabs {
    async fn get(&self, tab_id: i32) -> Result<TabSnapshot, String> {
        let tab_js = getTab(tab_id).await.map_err(|e| format!("{:?}", e))?;
        serde_wasm_bindgen::from_value(tab_js).map_err(|e| format!("Failed to parse tab: {:?}", e))
    }

    async fn query_active(&self) -> Result<Option<TabSnapshot>, String> {
        let tab_js = queryActiveTab().await.map_err(|e| format!("{:?}", e))?;
        if tab_js.is_null() || tab_js.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(tab_js)
            .map(Some)
            .map_err(|e| format!("Failed to parse tab: {:?}", e))
    }

    async fn create(&self, url: &str) -> Result<(), String> {
        createTab(url).await.map_err(|e| format!("{:?}", e))
    }

    async fn remove(&self, tab_id: i32) -> Result<(), String> {
        removeTab(tab_id).await.map_err(|e| format!("{:?}", e))
    }
}

/// browser.storage.local
pub struct BrowserStorage;

#[async_trait(?Send)]
impl KeyValueStore for BrowserStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        let value_js = getStorage(key)
            .await
            .map_err(|e| PersistenceError::Io(format!("{:?}", e)))?;

        if value_js.is_null() || value_js.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value_js)
            .map(Some)
            .map_err(|e| PersistenceError::Io(format!("Failed to parse storage: {:?}", e)))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        let value_js = to_js(&value).map_err(|e| PersistenceError::Io(format!("{:?}", e)))?;
        setStorage(key, value_js)
            .await
            .map_err(|e| PersistenceError::Io(format!("{:?}", e)))
    }
}

/// Plain JS objects and arrays rather than Maps
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// What the context menu listener hands over on a click
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenuClick {
    pub menu_item_id: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub link_text: Option<String>,
    #[serde(default)]
    pub tab_id: Option<i32>,
    /// Favicon of the page the click happened on
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

impl ContextMenuClick {
    pub fn into_request(self) -> Option<Request> {
        match self.menu_item_id.as_str() {
            HIBERNATE_TAB_MENU => self.tab_id.map(|tab_id| Request::HibernateTab { tab_id }),
            HIBERNATE_LINK_MENU => self.link_url.map(|url| {
                Request::HibernateLink(LinkTarget {
                    url,
                    title: self.link_text,
                    fav_icon_url: self.fav_icon_url,
                })
            }),
            _ => None,
        }
    }
}

type BackgroundRouter = MessageRouter<BrowserStorage, BrowserTabs, SystemClock>;

/// Build the router and hook it up to runtime messages, context menus and
/// the install event. Listeners live for the lifetime of the page.
pub fn install(config: &HibernateConfig) {
    let storage = InactiveTabStorage::new(BrowserStorage, config.storage_key.clone());
    let router: Rc<Mutex<BackgroundRouter>> = Rc::new(Mutex::new(MessageRouter::new(
        TabRecordStore::new(storage),
        BrowserTabs,
        SystemClock,
    )));

    listen_for_messages(router.clone());
    listen_for_context_menus(router.clone());
    listen_for_install(router);

    log::info!("Background listeners installed (storage key {})", config.storage_key);
}

fn listen_for_messages(router: Rc<Mutex<BackgroundRouter>>) {
    let handler = Closure::wrap(Box::new(move |message: JsValue| -> js_sys::Promise {
        let router = router.clone();
        future_to_promise(async move {
            let message: Value = serde_wasm_bindgen::from_value(message).unwrap_or(Value::Null);
            let response = handle_serialized(&router, message).await;
            to_js(&response).map_err(JsValue::from)
        })
    }) as Box<dyn FnMut(JsValue) -> js_sys::Promise>);

    onMessage(&handler);
    handler.forget();
}

fn listen_for_context_menus(router: Rc<Mutex<BackgroundRouter>>) {
    let handler = Closure::wrap(Box::new(move |click_js: JsValue| {
        let click: ContextMenuClick = match serde_wasm_bindgen::from_value(click_js) {
            Ok(click) => click,
            Err(e) => {
                log::warn!("Unreadable context menu click: {:?}", e);
                return;
            }
        };

        let Some(request) = click.into_request() else {
            log::warn!("Ignoring context menu click without a target");
            return;
        };

        let router = router.clone();
        spawn_local(async move {
            let response = handle_serialized(&router, request.to_message()).await;
            log::debug!("Context menu request answered: {}", response);
        });
    }) as Box<dyn FnMut(JsValue)>);

    registerContextMenus(HIBERNATE_TAB_MENU, HIBERNATE_LINK_MENU, &handler);
    handler.forget();
}

fn listen_for_install(router: Rc<Mutex<BackgroundRouter>>) {
    let handler = Closure::wrap(Box::new(move |reason: String| {
        if reason != "install" {
            return;
        }

        let router = router.clone();
        spawn_local(async move {
            if let Err(e) = router.lock().await.reset().await {
                log::error!("Failed to reset inactive tabs on install: {}", e);
            }
        });
    }) as Box<dyn FnMut(String)>);

    onInstalled(&handler);
    handler.forget();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn click(value: Value) -> ContextMenuClick {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tab_menu_click() {
        let request = click(json!({ "menuItemId": "hibernate-tab", "tabId": 4 })).into_request();

        assert_eq!(request, Some(Request::HibernateTab { tab_id: 4 }));
    }

    #[test]
    fn test_link_menu_click() {
        let request = click(json!({
            "menuItemId": "hibernate-link",
            "linkUrl": "https://example.com/page",
            "linkText": "A page",
            "tabId": 4,
            "favIconUrl": "https://example.com/favicon.ico"
        }))
        .into_request();

        assert_eq!(
            request,
            Some(Request::HibernateLink(LinkTarget {
                url: "https://example.com/page".to_string(),
                title: Some("A page".to_string()),
                fav_icon_url: Some("https://example.com/favicon.ico".to_string()),
            }))
        );
    }

    #[test]
    fn test_click_without_target() {
        assert_eq!(click(json!({ "menuItemId": "hibernate-link" })).into_request(), None);
        assert_eq!(click(json!({ "menuItemId": "hibernate-tab" })).into_request(), None);
        assert_eq!(click(json!({ "menuItemId": "other", "tabId": 1 })).into_request(), None);
    }
}
