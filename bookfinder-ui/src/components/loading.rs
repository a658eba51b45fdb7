//! Loading Component

use leptos::*;

/// Full-width loading spinner
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-12">
            <div class="loading-spinner w-8 h-8" />
        </div>
    }
}

/// Placeholder cards while a list loads
#[component]
pub fn CardSkeleton(
    #[prop(default = 3)]
    count: usize,
) -> impl IntoView {
    view! {
        <div class="grid md:grid-cols-3 gap-6 animate-pulse">
            {(0..count).map(|_| view! {
                <div class="bg-gray-800 rounded-xl p-4">
                    <div class="h-40 bg-gray-700 rounded mb-4" />
                    <div class="h-5 bg-gray-700 rounded w-2/3 mb-2" />
                    <div class="h-4 bg-gray-700 rounded w-1/2" />
                </div>
            }).collect_view()}
        </div>
    }
}
