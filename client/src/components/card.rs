//! Card container primitives.
//!
//! Stateless wrappers with a fixed base class list. A caller `class` is
//! appended to the base, and children render unchanged inside.

#[cfg(test)]
#[path = "card_test.rs"]
mod card_test;

use leptos::prelude::*;

use crate::util::classes::merge_classes;

pub const CARD_CLASS: &str = "rounded-lg border border-gray-200 bg-white shadow-sm";
pub const CARD_HEADER_CLASS: &str = "flex flex-col space-y-1.5 p-6";
pub const CARD_CONTENT_CLASS: &str = "p-6 pt-0";
pub const CARD_FOOTER_CLASS: &str = "flex items-center p-6 pt-0";

#[component]
pub fn Card(#[prop(optional, into)] class: Option<String>, children: Children) -> impl IntoView {
    view! { <div class=merge_classes(CARD_CLASS, class.as_deref())>{children()}</div> }
}

#[component]
pub fn CardHeader(#[prop(optional, into)] class: Option<String>, children: Children) -> impl IntoView {
    view! { <div class=merge_classes(CARD_HEADER_CLASS, class.as_deref())>{children()}</div> }
}

#[component]
pub fn CardContent(#[prop(optional, into)] class: Option<String>, children: Children) -> impl IntoView {
    view! { <div class=merge_classes(CARD_CONTENT_CLASS, class.as_deref())>{children()}</div> }
}

#[component]
pub fn CardFooter(#[prop(optional, into)] class: Option<String>, children: Children) -> impl IntoView {
    view! { <div class=merge_classes(CARD_FOOTER_CLASS, class.as_deref())>{children()}</div> }
}
