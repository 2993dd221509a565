//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element of the base
//! layout, either as the target of a failed htmx request or as an
//! out-of-band swap next to a successful response.

use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Success,
    Error,
}

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_html(self) -> Markup {
        let style = match self.alert_type {
            AlertType::Success => {
                "flex items-start gap-3 p-4 rounded border text-green-800 \
                border-green-300 bg-green-50 dark:bg-gray-800 dark:text-green-400 \
                dark:border-green-800"
            }
            AlertType::Error => {
                "flex items-start gap-3 p-4 rounded border text-red-800 \
                border-red-300 bg-red-50 dark:bg-gray-800 dark:text-red-400 \
                dark:border-red-800"
            }
        };

        html! {
            div
                role="alert"
                class=(style)
                data-alert-type=(match self.alert_type {
                    AlertType::Success => "success",
                    AlertType::Error => "error",
                })
            {
                div class="flex-1"
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="text-sm" { (self.details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="text-sm font-semibold"
                    onclick="this.closest('#alert-container').classList.add('hidden')"
                {
                    "✕"
                }
            }
        }
    }

    /// Render the alert so that htmx swaps it into the alert container
    /// alongside the main response.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                (self.into_html())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::alert::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let html = Html::parse_fragment(
            &Alert::error("Could not save", "Try again.")
                .into_html()
                .into_string(),
        );

        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found");
        assert_eq!(alert.value().attr("data-alert-type"), Some("error"));
        let text = alert.text().collect::<String>();
        assert!(text.contains("Could not save"));
        assert!(text.contains("Try again."));
    }

    #[test]
    fn oob_alert_targets_alert_container() {
        let html = Html::parse_fragment(
            &Alert::success("Merchant Successfully Added", "")
                .into_oob_html()
                .into_string(),
        );

        let container = html
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("No alert container found");
        assert_eq!(container.value().attr("hx-swap-oob"), Some("true"));
        assert_eq!(
            html.select(&Selector::parse("p").unwrap()).count(),
            1,
            "want no details paragraph for an alert without details"
        );
    }
}
