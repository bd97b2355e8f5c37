//! Home page component.

use leptos::prelude::*;

/// The landing page shown to anonymous visitors.
#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <h1>"corrlinker"</h1>
            <p>"Please log in to continue."</p>
            <a href="/login" class="cta-button">"Log in"</a>
        </div>
    }
}

/// Renders the landing page document.
pub fn render() -> String {
    super::render_document("corrlinker", view! { <HomePage/> })
}
