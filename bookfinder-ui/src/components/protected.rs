//! Protected Route Wrapper
//!
//! Renders its children only with a session; otherwise redirects to `/login`.

use leptos::*;
use leptos_router::*;

use crate::state::global::use_global_state;

#[component]
pub fn Protected(children: ChildrenFn) -> impl IntoView {
    let state = use_global_state();

    view! {
        <Show
            when=move || state.is_logged_in()
            fallback=|| view! { <Redirect path="/login" /> }
        >
            {children()}
        </Show>
    }
}
