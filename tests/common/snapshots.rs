use serde_json::{Value, json};

use form_detection::dom::dom_model::DocumentSnapshot;

// =========================================================================
// Snapshot builders shared across the test suite
// =========================================================================

pub fn doc(url: &str, title: &str, body_children: Value) -> DocumentSnapshot {
    let raw = json!({
        "url": url,
        "title": title,
        "dom": {
            "tag": "html",
            "children": [
                { "tag": "body", "children": body_children }
            ]
        }
    });
    DocumentSnapshot::from_value(raw).expect("snapshot builds")
}

pub fn input(input_type: &str, name: &str, required: bool) -> Value {
    let mut attrs = json!({ "type": input_type, "name": name, "id": name });
    if required {
        attrs["required"] = json!("");
    }
    json!({ "tag": "input", "attrs": attrs })
}

pub fn label(for_id: &str, text: &str) -> Value {
    json!({ "tag": "label", "attrs": { "for": for_id }, "text": text })
}

pub fn submit_button(text: &str) -> Value {
    json!({ "tag": "button", "attrs": { "type": "submit" }, "text": text })
}

// =========================================================================
// Canonical pages
// =========================================================================

/// Secure login page: labeled email + password, submit "Log In".
pub fn login_page() -> DocumentSnapshot {
    doc(
        "https://example.com/login",
        "Sign In",
        json!([{
            "tag": "form",
            "attrs": { "id": "login", "class": "login-form", "action": "/session" },
            "children": [
                label("email", "Email address"),
                input("email", "email", true),
                label("password", "Password"),
                input("password", "password", true),
                submit_button("Log In")
            ]
        }]),
    )
}

/// Newsletter widget: single email field, subscribe button.
pub fn newsletter_page() -> DocumentSnapshot {
    doc(
        "https://blog.example.com/post/42",
        "A Blog Post",
        json!([{
            "tag": "form",
            "attrs": { "id": "newsletter-signup" },
            "children": [
                input("email", "email", false),
                submit_button("Subscribe")
            ]
        }]),
    )
}

/// 8 text fields, one real label, no submit control, insecure origin.
pub fn unlabeled_form_page() -> DocumentSnapshot {
    let mut children = vec![label("f1", "First field"), input("text", "f1", false)];
    for i in 2..=8 {
        children.push(input("text", &format!("f{}", i), false));
    }
    doc(
        "http://example.org/page",
        "Some Page",
        json!([{
            "tag": "form",
            "attrs": { "id": "f-main" },
            "children": children
        }]),
    )
}

/// Google Docs document page: editor domain plus editor structure.
pub fn docs_editor_page() -> DocumentSnapshot {
    let long_text = "lorem ipsum ".repeat(60);
    doc(
        "https://docs.google.com/document/d/abc123/edit",
        "My Document - Google Docs",
        json!([
            { "tag": "div", "attrs": { "role": "toolbar", "class": "editor-toolbar" } },
            { "tag": "div", "attrs": { "contenteditable": "true" }, "text": long_text },
            { "tag": "div", "attrs": { "contenteditable": "true" }, "text": "notes" }
        ]),
    )
}

/// Twitter login flow: excepted path on a blocked domain.
pub fn twitter_login_page() -> DocumentSnapshot {
    doc(
        "https://twitter.com/i/flow/login",
        "Log in to Twitter",
        json!([{
            "tag": "form",
            "attrs": { "id": "login-form", "class": "login-flow" },
            "children": [
                { "tag": "input", "attrs": {
                    "type": "email", "name": "email", "required": "",
                    "aria-label": "Email address"
                }},
                { "tag": "input", "attrs": {
                    "type": "password", "name": "password", "required": "",
                    "aria-label": "Password"
                }},
                submit_button("Log in")
            ]
        }]),
    )
}

/// No explicit form: a signup-shaped cluster of controls under a div.
pub fn implicit_cluster_page() -> DocumentSnapshot {
    doc(
        "https://app.example.com/register",
        "Create your account",
        json!([{
            "tag": "div",
            "attrs": { "id": "signup-box", "class": "signup-form" },
            "children": [
                label("email", "Email"),
                input("email", "email", true),
                label("password", "Password"),
                input("password", "password", true),
                label("confirm", "Confirm password"),
                input("password", "confirm", true),
                submit_button("Create account")
            ]
        }]),
    )
}

/// Five labeled fields with validation: dominant enough to make the page a
/// primary-form page on its own.
pub fn application_page() -> DocumentSnapshot {
    doc(
        "https://example.com/apply",
        "Job Application",
        json!([{
            "tag": "form",
            "attrs": { "id": "application-form", "class": "application", "action": "/apply" },
            "children": [
                label("name", "Full name"),
                input("text", "name", true),
                label("email", "Email"),
                input("email", "email", true),
                label("phone", "Phone"),
                input("tel", "phone", true),
                label("subject", "Position"),
                input("text", "subject", true),
                label("message", "Cover letter"),
                { "tag": "textarea", "attrs": { "name": "message", "id": "message", "required": "" } },
                submit_button("Apply")
            ]
        }]),
    )
}

/// A page with no interactive controls at all.
pub fn empty_page() -> DocumentSnapshot {
    doc(
        "https://example.com/about",
        "About Us",
        json!([
            { "tag": "h1", "text": "About" },
            { "tag": "p", "text": "We make things." }
        ]),
    )
}
