//! User profile page component.

use corrlinker_platform_access::Profile;
use leptos::prelude::*;
use serde_json::Value;

/// Shows the signed-in user and every claim of their profile.
#[component]
pub fn UserPage(profile: Profile) -> impl IntoView {
    let greeting = profile
        .display_name()
        .map(|name| format!("Welcome, {name}!"))
        .unwrap_or_else(|| "Welcome!".to_string());
    let email = profile.email().map(str::to_string);
    let picture = profile.picture().map(str::to_string);

    let claims = profile
        .claims()
        .map(|(claim, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            view! {
                <tr>
                    <th>{claim.clone()}</th>
                    <td>{value}</td>
                </tr>
            }
        })
        .collect_view();

    view! {
        <div class="user-page">
            {picture.map(|src| view! { <img class="avatar" src=src alt="Profile picture"/> })}
            <h1>{greeting}</h1>
            {email.map(|email| view! { <p class="email">{email}</p> })}
            <table class="claims">
                <tbody>{claims}</tbody>
            </table>
            <a href="/logout" class="logout-button">"Log out"</a>
        </div>
    }
}

/// Renders the profile page document.
pub fn render(profile: Profile) -> String {
    super::render_document("corrlinker: profile", view! { <UserPage profile=profile/> })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(claims: Value) -> Profile {
        Profile::new(serde_json::from_value(claims).unwrap())
    }

    #[test]
    fn shows_identity_and_logout_link() {
        let html = render(profile(json!({
            "sub": "auth0|1",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "picture": "https://example.com/ada.png"
        })));

        assert!(html.contains("Welcome, Ada Lovelace!"));
        assert!(html.contains("ada@example.com"));
        assert!(html.contains("https://example.com/ada.png"));
        assert!(html.contains("auth0|1"));
        assert!(html.contains("href=\"/logout\""));
    }

    #[test]
    fn claim_values_are_escaped() {
        let html = render(profile(json!({
            "sub": "auth0|1",
            "nickname": "<script>alert(1)</script>"
        })));

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn missing_optional_claims_are_omitted() {
        let html = render(profile(json!({"sub": "auth0|1"})));
        assert!(html.contains("Welcome!"));
        assert!(!html.contains("class=\"avatar\""));
        assert!(!html.contains("class=\"email\""));
    }
}
