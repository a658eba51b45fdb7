//! Login Page

use leptos::*;
use leptos_router::*;

use crate::state::global::use_global_state;

#[component]
pub fn Login() -> impl IntoView {
    let state = use_global_state();
    let navigate = use_navigate();

    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());

    // Already logged in (or just logged in): go to favorites
    create_effect(move |_| {
        if state.is_logged_in() {
            navigate("/favorites", Default::default());
        }
    });

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let email = email.get().trim().to_string();
        let password = password.get();
        if email.is_empty() || password.is_empty() {
            state.show_error("Email and password are required.");
            return;
        }

        spawn_local(async move {
            match state.login(email, password).await {
                Ok(()) => state.show_success("Logged in!"),
                Err(message) => state.show_error(&message),
            }
        });
    };

    view! {
        <div class="space-y-8 max-w-lg">
            <div>
                <h1 class="text-3xl font-bold">"Login"</h1>
                <p class="text-gray-400 mt-1">"Access your saved favorites."</p>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <form class="space-y-4" on:submit=on_submit>
                    <input
                        type="email"
                        placeholder="Email"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-amber-500 focus:outline-none"
                    />
                    <input
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-amber-500 focus:outline-none"
                    />
                    <button
                        type="submit"
                        disabled=move || state.loading.get()
                        class="w-full px-6 py-3 bg-amber-600 hover:bg-amber-700 disabled:bg-gray-600 rounded-lg font-medium transition-colors"
                    >
                        {move || if state.loading.get() { "Logging in..." } else { "Login" }}
                    </button>
                </form>

                <p class="text-gray-400 text-sm mt-4">
                    "Don't have an account? "
                    <A href="/register" class="text-amber-400 font-semibold">"Register"</A>
                </p>
            </section>
        </div>
    }
}
