//! Navigation Component
//!
//! Header navigation bar. Shows Favorites, the user's name, and Logout
//! while logged in; Login and Register otherwise.

use leptos::*;
use leptos_router::*;

use crate::state::global::use_global_state;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = use_global_state();
    let navigate = use_navigate();

    let logout = move |_| {
        state.logout();
        state.show_success("Logged out");
        navigate("/", Default::default());
    };

    view! {
        <nav class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    // Logo and brand
                    <A href="/" class="flex items-center space-x-3">
                        <span class="w-8 h-8 rounded-lg bg-amber-500 text-gray-900 font-bold flex items-center justify-center">
                            "B"
                        </span>
                        <span class="text-xl font-bold text-white">"Book Finder"</span>
                    </A>

                    // Navigation links
                    <div class="flex items-center space-x-1">
                        <NavLink href="/" label="Search" />
                        <NavLink href="/books" label="All Books" />
                        {move || match state.session.get() {
                            Some(session) => view! {
                                <NavLink href="/favorites" label="Favorites" />
                                <div class="flex items-center space-x-3 pl-3 ml-2 border-l border-gray-600">
                                    <span class="text-sm text-gray-300">
                                        "Hi, " <b>{session.user.name}</b> " 👋"
                                    </span>
                                    <button
                                        type="button"
                                        on:click=logout.clone()
                                        class="px-3 py-2 rounded-lg bg-gray-700 hover:bg-gray-600 transition-colors"
                                    >
                                        "Logout"
                                    </button>
                                </div>
                            }.into_view(),
                            None => view! {
                                <NavLink href="/login" label="Login" />
                                <NavLink href="/register" label="Register" />
                            }.into_view(),
                        }}
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
            active_class="bg-gray-700 text-white"
            exact=true
        >
            {label}
        </A>
    }
}
