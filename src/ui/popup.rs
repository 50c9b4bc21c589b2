/// Popup UI: list of hibernated tabs
///
/// The popup holds no authoritative state. Every action is a message to
/// the background page followed by a fresh `getInactiveTabs`.

use patternfly_yew::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::config::HibernateConfig;
use crate::router::{Request, Response};
use crate::tab_record::{RecordRef, TabRecord};
use crate::ui::components::{ConfirmDialog, TabRow};

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Clone, PartialEq)]
enum ListState {
    Loading,
    Loaded(Vec<TabRecord>),
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| HibernateConfig::default());
    let list = use_state(|| ListState::Loading);
    let action_error = use_state(|| None::<String>);
    let busy = use_state(|| false);
    let pending_remove = use_state(|| None::<String>); // record ID awaiting confirmation

    let reload = {
        let list = list.clone();
        Callback::from(move |_: ()| {
            let list = list.clone();
            spawn_local(async move {
                match fetch_records().await {
                    Ok(records) => list.set(ListState::Loaded(records)),
                    Err(e) => {
                        log::error!("Error loading inactive tabs: {}", e);
                        list.set(ListState::Error(e));
                    }
                }
            });
        })
    };

    // Load the list on mount
    {
        let reload = reload.clone();
        use_effect_with((), move |_| {
            reload.emit(());
            || ()
        });
    }

    // Runs a mutating request, then refreshes whatever the outcome
    let run = {
        let reload = reload.clone();
        let action_error = action_error.clone();
        let busy = busy.clone();
        move |request: Request| {
            let reload = reload.clone();
            let action_error = action_error.clone();
            let busy = busy.clone();
            busy.set(true);
            spawn_local(async move {
                match send(&request).await {
                    Ok(response) if response.is_success() => action_error.set(None),
                    Ok(Response::Status { error, .. }) => {
                        action_error.set(Some(error.unwrap_or_else(|| "Request failed".to_string())));
                    }
                    Ok(Response::Tabs(_)) => action_error.set(None),
                    Err(e) => action_error.set(Some(e)),
                }
                busy.set(false);
                reload.emit(());
            });
        }
    };

    let on_hibernate_current = {
        let run = run.clone();
        Callback::from(move |_| run(Request::AddTabToInactive))
    };

    let on_restore = {
        let run = run.clone();
        Callback::from(move |id: String| run(Request::RestoreTab(RecordRef::Id(id))))
    };

    let on_remove = {
        let pending_remove = pending_remove.clone();
        Callback::from(move |id: String| pending_remove.set(Some(id)))
    };

    let on_confirm_remove = {
        let run = run.clone();
        let pending_remove = pending_remove.clone();
        Callback::from(move |_| {
            if let Some(id) = (*pending_remove).clone() {
                pending_remove.set(None);
                run(Request::RemoveInactiveTab(RecordRef::Id(id)));
            }
        })
    };

    let on_cancel_remove = {
        let pending_remove = pending_remove.clone();
        Callback::from(move |_| pending_remove.set(None))
    };

    let is_busy = *busy;
    let default_favicon = AttrValue::from(config.default_favicon.clone());

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Hibernate"}</h1>

            <Button onclick={on_hibernate_current} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                {"Hibernate current tab"}
            </Button>

            if let Some(err) = (*action_error).clone() {
                <div class="message-top-margin">
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err}
                    </Alert>
                </div>
            }

            <div id="inactive-tabs-list" class="tab-list">
                {match &*list {
                    ListState::Loading => html! {
                        <div class="loading-text-center">
                            <Spinner />
                        </div>
                    },
                    ListState::Error(_) => html! {
                        <div class="error">{"Error loading tabs. Please try again."}</div>
                    },
                    ListState::Loaded(records) if records.is_empty() => html! {
                        <div class="empty-state">{"No inactive tabs. Store a tab to get started."}</div>
                    },
                    ListState::Loaded(records) => html! {
                        {for records.iter().map(|record| html! {
                            <TabRow
                                key={record.id.clone()}
                                record={record.clone()}
                                default_favicon={default_favicon.clone()}
                                on_restore={on_restore.clone()}
                                on_remove={on_remove.clone()}
                                disabled={is_busy}
                            />
                        })}
                    },
                }}
            </div>

            if pending_remove.is_some() {
                <ConfirmDialog
                    message={"Are you sure you want to remove this tab?"}
                    on_confirm={on_confirm_remove}
                    on_cancel={on_cancel_remove}
                />
            }
        </div>
    }
}

// Helper functions

async fn send(request: &Request) -> Result<Response, String> {
    let message = request
        .to_message()
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {:?}", e))?;

    let response_js = sendMessage(message)
        .await
        .map_err(|e| format!("Message failed: {:?}", e))?;

    serde_wasm_bindgen::from_value(response_js).map_err(|e| format!("Failed to parse response: {:?}", e))
}

async fn fetch_records() -> Result<Vec<TabRecord>, String> {
    match send(&Request::GetInactiveTabs).await? {
        Response::Tabs(records) => Ok(records),
        Response::Status { error, .. } => Err(error.unwrap_or_else(|| "Unexpected response".to_string())),
    }
}
