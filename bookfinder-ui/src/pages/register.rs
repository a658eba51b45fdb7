//! Register Page

use leptos::*;
use leptos_router::*;

use crate::state::global::use_global_state;

#[component]
pub fn Register() -> impl IntoView {
    let state = use_global_state();
    let navigate = use_navigate();

    let (name, set_name) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());

    create_effect(move |_| {
        if state.is_logged_in() {
            navigate("/favorites", Default::default());
        }
    });

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let name = name.get().trim().to_string();
        let email = email.get().trim().to_string();
        let password = password.get();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            state.show_error("Name, email, and password are required.");
            return;
        }

        spawn_local(async move {
            match state.register(name, email, password).await {
                Ok(()) => state.show_success("Account created!"),
                Err(message) => state.show_error(&message),
            }
        });
    };

    view! {
        <div class="space-y-8 max-w-lg">
            <div>
                <h1 class="text-3xl font-bold">"Register"</h1>
                <p class="text-gray-400 mt-1">"Create an account to save favorites and write reviews."</p>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <form class="space-y-4" on:submit=on_submit>
                    <input
                        type="text"
                        placeholder="Name"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                        class="w-full bg-gray-700 rounded-lg px-4 py-3 border border-gray-600 focus:border-amber-500 focus:outline-none"
                    />
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
                        {move || if state.loading.get() { "Creating account..." } else { "Register" }}
                    </button>
                </form>

                <p class="text-gray-400 text-sm mt-4">
                    "Already have an account? "
                    <A href="/login" class="text-amber-400 font-semibold">"Login"</A>
                </p>
            </section>
        </div>
    }
}
