// src/domain/format.rs

use crate::domain::listing::Listing;

/// Whole-dollar currency with thousands grouping. None and zero both render
/// "N/A": upstream forms use 0 interchangeably with "not provided".
pub fn format_currency(amount: Option<i64>) -> String {
    match amount {
        None | Some(0) => "N/A".to_string(),
        Some(n) => format!("${}", group_thousands(n)),
    }
}

pub fn format_percent(rate: Option<f64>) -> String {
    match rate {
        None => "N/A".to_string(),
        Some(r) => format!("{r}%"),
    }
}

/// Plain grouped integer for non-currency quantities (square footage etc.).
pub fn format_count(n: Option<i64>) -> String {
    match n {
        None => "N/A".to_string(),
        Some(n) => group_thousands(n),
    }
}

/// Attachment sizes: B under 1 KB, then one-decimal KB/MB.
pub fn format_file_size(bytes: Option<i64>) -> String {
    match bytes {
        None | Some(0) => "Unknown size".to_string(),
        Some(b) if b < 1024 => format!("{b} B"),
        Some(b) if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Whether an editable field already carried a value in the source record,
/// i.e. was extracted from an inbound email rather than typed by a user.
/// Purely a provenance hint for the editor UI, not a validation rule.
pub fn is_auto_populated(field: &str, source: &Listing) -> bool {
    match field {
        "street_address" => !source.street_address.trim().is_empty(),
        "neighborhood" => source
            .neighborhood
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty()),
        "asking_price" => source.asking_price.is_some(),
        "total_units" => source.total_units.is_some(),
        "residential_units" => source.residential_units.is_some(),
        "vacant_residential" => source.vacant_residential.is_some(),
        "commercial_units" => source.commercial_units.is_some(),
        "vacant_commercial" => source.vacant_commercial.is_some(),
        _ => false,
    }
}

/// Attachment content-type classes used by the source-materials pane.
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("pdf"))
}

pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.contains("image"))
}
