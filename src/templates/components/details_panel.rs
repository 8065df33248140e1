use maud::{html, Markup};

use crate::domain::format::{format_count, format_currency, format_percent};
use crate::domain::listing::DetailsPayload;

/// Sensitive details section of the detail page. None means the lookup
/// failed or there is no payload; the page still renders everything else.
pub fn details_panel(details: Option<&DetailsPayload>) -> Markup {
    let Some(details) = details else {
        return html! {
            div class="card details" {
                h3 { "Property Details" }
                p class="empty" { "Details are not available for this listing." }
            }
        };
    };

    let f = &details.financials;
    html! {
        div class="card details" {
            h3 { "Property Details" }

            table class="details-table" {
                tbody {
                    (row("Contact phone", details.phone_number.clone().unwrap_or_else(|| "N/A".into())))
                    (row("Soft-story work required", match details.soft_story {
                        Some(true) => "Yes".to_string(),
                        Some(false) => "No".to_string(),
                        None => "N/A".to_string(),
                    }))
                    (row("Square footage", format_count(details.square_footage)))
                    (row("Parking spaces", format_count(details.parking_spaces)))
                    (row("Unit mix", details.unit_mix.clone().unwrap_or_else(|| "N/A".into())))
                }
            }

            h4 { "Financials" }
            table class="details-table" {
                tbody {
                    (row("Monthly income", format_currency(f.monthly_income)))
                    (row("Total rents", format_currency(f.total_rents)))
                    (row("Other income", format_currency(f.other_income)))
                    (row("Total monthly income", format_currency(f.total_monthly_income)))
                    (row("Total annual income", format_currency(f.total_annual_income)))
                    (row("Annual expenses", format_currency(f.annual_expenses)))
                    (row("Net operating income", format_currency(f.net_operating_income)))
                    (row("Property tax rate", format_percent(f.property_tax_rate)))
                    (row("Property tax amount", format_currency(f.property_tax_amount)))
                    (row("Management rate", format_percent(f.management_rate)))
                    (row("Management amount", format_currency(f.management_amount)))
                    (row("Insurance", format_currency(f.insurance)))
                    (row("Utilities", format_currency(f.utilities)))
                    (row("Maintenance", format_currency(f.maintenance)))
                    (row("Other expenses", format_currency(f.other_expenses)))
                }
            }

            @if !details.rent_roll.is_empty() {
                h4 { "Rent Roll" }
                table class="details-table" {
                    thead {
                        tr {
                            th { "Unit" }
                            th { "Monthly Rent" }
                            th { "Occupied" }
                        }
                    }
                    tbody {
                        @for entry in &details.rent_roll {
                            tr {
                                td { (entry.unit.as_deref().unwrap_or("—")) }
                                td { (format_currency(entry.monthly_rent)) }
                                td {
                                    @match entry.occupied {
                                        Some(true) => { "Yes" }
                                        Some(false) => { "No" }
                                        None => { "—" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn row(label: &str, value: String) -> Markup {
    html! {
        tr {
            td class="label" { (label) }
            td { (value) }
        }
    }
}
