//! Display strings for report content.
//!
//! Every function here is total: missing optional data is omitted or replaced
//! with a fixed fallback, never turned into an error.

use chrono::{DateTime, NaiveDate, Utc};

use super::model::{ApplicatorRef, CustomerRef, TreatedArea, WeatherSnapshot};

pub const NOT_RECORDED: &str = "Not recorded";
pub const NOT_SPECIFIED: &str = "Not specified";

/// `Monday, March 4, 2024, 2:30 PM`
pub fn format_date_time(ts: &DateTime<Utc>) -> String {
    ts.format("%A, %B %-d, %Y, %-I:%M %p").to_string()
}

/// `Monday, March 4, 2024`
pub fn format_long_date(date: &NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `Mar 4, 2024`
pub fn format_short_date(date: &NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_date_range(from: &NaiveDate, to: &NaiveDate) -> String {
    format!("{} - {}", format_short_date(from), format_short_date(to))
}

pub fn format_weather(weather: Option<&WeatherSnapshot>) -> String {
    let Some(w) = weather else {
        return NOT_RECORDED.to_string();
    };

    let mut parts = Vec::with_capacity(4);
    if let Some(t) = w.temperature {
        parts.push(format!("{}°F", t));
    }
    if let Some(h) = w.humidity {
        parts.push(format!("{}%", h));
    }
    if let Some(speed) = w.wind_speed {
        match non_blank(w.wind_direction.as_deref()) {
            Some(dir) => parts.push(format!("{} mph {}", speed, dir)),
            None => parts.push(format!("{} mph", speed)),
        }
    }
    if let Some(condition) = non_blank(w.condition.as_deref()) {
        parts.push(condition.to_string());
    }

    if parts.is_empty() {
        NOT_RECORDED.to_string()
    } else {
        parts.join(", ")
    }
}

pub fn format_applicator(applicator: &ApplicatorRef) -> String {
    let name = format!("{} {}", applicator.first_name, applicator.last_name)
        .trim()
        .to_string();

    match (
        non_blank(applicator.license_state.as_deref()),
        non_blank(applicator.license_number.as_deref()),
    ) {
        (Some(state), Some(number)) => format!("{} (License: {}-{})", name, state, number),
        (None, Some(number)) => format!("{} (License: {})", name, number),
        _ => name,
    }
}

pub fn format_amount(quantity: f64, unit: &str) -> String {
    format!("{} {}", quantity, unit).trim().to_string()
}

pub fn format_area(area: Option<&TreatedArea>) -> String {
    match area {
        Some(a) => format_amount(a.value, &a.unit),
        None => NOT_SPECIFIED.to_string(),
    }
}

pub fn format_chemical(name: &str, epa_reg_number: Option<&str>) -> String {
    match non_blank(epa_reg_number) {
        Some(number) => format!("{} (EPA Reg. No. {})", name, number),
        None => name.to_string(),
    }
}

/// `123 Main St, Fresno, CA 93701`, skipping absent parts.
pub fn format_address(customer: &CustomerRef) -> String {
    let locality = [non_blank(customer.city.as_deref()), non_blank(customer.state.as_deref())]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    let locality = match non_blank(customer.zip.as_deref()) {
        Some(zip) if locality.is_empty() => zip.to_string(),
        Some(zip) => format!("{} {}", locality, zip),
        None => locality,
    };

    [non_blank(customer.address.as_deref()), non_blank(Some(locality.as_str()))]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_location(customer: &CustomerRef) -> String {
    let address = format_address(customer);
    if address.is_empty() {
        customer.name.clone()
    } else {
        format!("{} - {}", customer.name, address)
    }
}

pub fn format_consent(consent: bool) -> &'static str {
    if consent {
        "Yes"
    } else {
        "No"
    }
}

pub fn or_not_specified(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(NOT_SPECIFIED).to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
