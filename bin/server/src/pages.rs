//! Page components for the application.
//!
//! Pages are Leptos components rendered to HTML strings on the server; there
//! is no client-side hydration.

pub mod home;
pub mod user;

pub use home::HomePage;
pub use user::UserPage;

use leptos::prelude::*;

/// Wraps page content in the HTML document shell.
pub fn render_document(title: &str, content: impl IntoView + 'static) -> String {
    let title = title.to_string();
    let document = view! {
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{title}</title>
                <link rel="stylesheet" href="/css/main.css"/>
            </head>
            <body>{content}</body>
        </html>
    };
    format!("<!DOCTYPE html>{}", document.to_html())
}
