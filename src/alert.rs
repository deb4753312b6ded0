//! Alert fragments for success and error messages.
//!
//! Alerts are rendered as HTML fragments and swapped into the fixed
//! `#alert-container` element via an htmx out-of-band swap, so an endpoint
//! can report a problem without replacing the page.

use maud::{Markup, html};

/// A dismissable alert message.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Confirmation that an operation succeeded.
    Success {
        /// A short headline.
        message: String,
        /// Supporting detail, may be empty.
        details: String,
    },
    /// A problem the user can usually correct.
    Error {
        /// A short headline.
        message: String,
        /// Supporting detail, may be empty.
        details: String,
    },
}

impl Alert {
    /// Create a success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Alert::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create an error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Alert::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as an out-of-band fragment targeting
    /// `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "p-4 text-green-800 border border-green-300 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "p-4 text-red-800 border border-red-300 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                message,
                details,
            ),
        };

        html! {
            div hx-swap-oob="innerHTML:#alert-container"
            {
                div class=(container_style) role="alert"
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm" { (details) }
                    }

                    button
                        type="button"
                        class="mt-2 text-sm underline cursor-pointer"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "Dismiss"
                    }
                }
            }
        }
    }
}
