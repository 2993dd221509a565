use maud::{DOCTYPE, Markup, html};

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::merchant::MerchantStatus;
use crate::transaction::TransactionStatus;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "py-2.5 px-5 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700 disabled:opacity-50 disabled:cursor-not-allowed";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_ERROR_STYLE: &str = "mt-1 text-sm text-red-600 dark:text-red-400";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Merchant Console" }
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }
                    "#
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                // Alert container for out-of-band swaps
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Merchants"
                    }
                }
            }
        }
    );

    base(title, &content)
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-blue-600 w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// A "Loading..." message with a spinner, shown until the first response arrives.
pub fn loading_view() -> Markup {
    html! {
        div class="flex items-center justify-center p-6 text-gray-700 dark:text-gray-300"
        {
            (loading_spinner())
            span { "Loading..." }
        }
    }
}

/// Format `number` as US dollars with two decimal places, e.g. "$1,234.50".
///
/// The formatters are built on first use and reused for every later call.
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    if number == 0.0 {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "$0.00".to_owned();
    }

    let currency_formatter = |prefix: &str| {
        Formatter::currency(prefix)
            .inspect_err(|error| tracing::error!("could not create currency formatter: {error:?}"))
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    };

    let formatted = if number < 0.0 {
        NEGATIVE_FMT
            .get_or_init(|| currency_formatter("-$"))
            .as_ref()
            .map(|formatter| formatter.fmt_string(number.abs()))
            .unwrap_or_else(|| format!("-${:.2}", number.abs()))
    } else {
        POSITIVE_FMT
            .get_or_init(|| currency_formatter("$"))
            .as_ref()
            .map(|formatter| formatter.fmt_string(number))
            .unwrap_or_else(|| format!("${number:.2}"))
    };

    pad_cents(formatted)
}

/// numfmt omits trailing zeros, e.g. "12.30" is rendered as "12.3", so the
/// cents are padded back out to two digits.
fn pad_cents(mut formatted: String) -> String {
    match formatted.rfind('.') {
        None => formatted.push_str(".00"),
        Some(dot) => {
            for _ in formatted.len() - dot - 1..2 {
                formatted.push('0');
            }
        }
    }

    formatted
}

const DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Format a timestamp for a table cell, e.g. "2025-06-01 09:00".
pub fn format_date(date: OffsetDateTime) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|error| {
        tracing::error!("could not format date {date}: {error}");
        date.to_string()
    })
}

/// A coloured badge showing a merchant status.
pub fn merchant_status_badge(status: MerchantStatus) -> Markup {
    let colours = match status {
        MerchantStatus::Active => "text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300",
        MerchantStatus::Inactive => "text-gray-800 bg-gray-100 dark:bg-gray-700 dark:text-gray-300",
        MerchantStatus::Pending => {
            "text-yellow-800 bg-yellow-100 dark:bg-yellow-900 dark:text-yellow-300"
        }
    };

    status_badge(status.as_str(), colours)
}

pub fn transaction_status_badge(status: TransactionStatus) -> Markup {
    let colours = match status {
        TransactionStatus::Success => {
            "text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300"
        }
        TransactionStatus::Failed => "text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300",
        TransactionStatus::Pending => {
            "text-yellow-800 bg-yellow-100 dark:bg-yellow-900 dark:text-yellow-300"
        }
    };

    status_badge(status.as_str(), colours)
}

fn status_badge(label: &str, colours: &str) -> Markup {
    html!(
        span class={ "inline-flex items-center px-2.5 py-0.5 text-xs font-semibold rounded-full " (colours) }
        {
            (label)
        }
    )
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE)
        {
          (text)
        }
    )
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::html::{format_currency, format_date, pad_cents};

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn keeps_two_decimal_places() {
        assert_eq!(format_currency(12.3), "$12.30");
        assert_eq!(format_currency(-5.25), "-$5.25");
    }

    #[test]
    fn pads_missing_cents() {
        assert_eq!(pad_cents("$5".to_owned()), "$5.00");
        assert_eq!(pad_cents("$5.1".to_owned()), "$5.10");
        assert_eq!(pad_cents("$5.12".to_owned()), "$5.12");
    }

    #[test]
    fn formats_date_to_the_minute() {
        assert_eq!(format_date(datetime!(2025-06-01 09:05:59 UTC)), "2025-06-01 09:05");
    }
}
