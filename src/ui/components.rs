/// Reusable UI components

use patternfly_yew::prelude::*;
use web_sys::HtmlImageElement;
use yew::prelude::*;

use crate::tab_record::TabRecord;

#[derive(Properties, PartialEq)]
pub struct TabRowProps {
    pub record: TabRecord,
    pub default_favicon: AttrValue,
    pub on_restore: Callback<String>,
    pub on_remove: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// One hibernated tab: favicon, title (URL on hover), restore/remove
#[function_component(TabRow)]
pub fn tab_row(props: &TabRowProps) -> Html {
    let record = &props.record;

    let favicon = if record.fav_icon_url.is_empty() {
        props.default_favicon.to_string()
    } else {
        record.fav_icon_url.clone()
    };

    let on_favicon_error = {
        let fallback = props.default_favicon.clone();
        Callback::from(move |e: Event| {
            if let Some(img) = e.target_dyn_into::<HtmlImageElement>() {
                // Avoid looping if the fallback itself is broken
                if !img.src().ends_with(fallback.as_str()) {
                    img.set_src(&fallback);
                }
            }
        })
    };

    let on_restore = {
        let id = record.id.clone();
        let on_restore = props.on_restore.clone();
        Callback::from(move |_| on_restore.emit(id.clone()))
    };

    let on_remove = {
        let id = record.id.clone();
        let on_remove = props.on_remove.clone();
        Callback::from(move |_| on_remove.emit(id.clone()))
    };

    html! {
        <div class="inactive-tab">
            <img class="tab-favicon" src={favicon} onerror={on_favicon_error} />
            <div class="tab-text">
                <div class="tab-title" title={record.url.clone()}>{record.display_title()}</div>
                if let Some(host) = record.host() {
                    <div class="tab-host">{host}</div>
                }
            </div>
            <div class="tab-actions">
                <Button onclick={on_restore} disabled={props.disabled} variant={ButtonVariant::Secondary}>
                    {"Restore"}
                </Button>
                <Button onclick={on_remove} disabled={props.disabled} variant={ButtonVariant::Danger}>
                    {"Remove"}
                </Button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ConfirmDialogProps {
    pub message: AttrValue,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

/// Inline yes/no overlay; `window.confirm` is not available in popups
#[function_component(ConfirmDialog)]
pub fn confirm_dialog(props: &ConfirmDialogProps) -> Html {
    let on_ok = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_| on_confirm.emit(()))
    };
    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <div class="confirm-dialog">
            <div class="confirm-box">
                <p class="confirm-message">{&props.message}</p>
                <div class="confirm-actions">
                    <Button onclick={on_ok} variant={ButtonVariant::Danger}>{"OK"}</Button>
                    <Button onclick={on_cancel} variant={ButtonVariant::Secondary}>{"Cancel"}</Button>
                </div>
            </div>
        </div>
    }
}
