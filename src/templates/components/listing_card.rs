use chrono::{DateTime, Utc};
use maud::{html, Markup};

use crate::domain::format::format_currency;
use crate::domain::listing::Listing;
use crate::templates::components::countdown::countdown_badge;

/// One listing in the dashboard grid. The whole card links to the detail
/// view.
pub fn listing_card(listing: &Listing, now: DateTime<Utc>) -> Markup {
    html! {
        a class="card listing-card" href=(format!("/listings/{}", listing.id)) {
            div class="card-header" {
                h3 { (listing.address_label()) }
                (countdown_badge(listing.time_sent_tz, now))
            }

            p class="price" { (format_currency(listing.asking_price)) }

            div class="card-meta" {
                span { (listing.neighborhood.as_deref().unwrap_or("Unassigned neighborhood")) }
                @if let Some(units) = listing.total_units {
                    span { (units) " units" }
                }
                @if listing.is_vacant_lot {
                    span class="tag tag-lot" { "Vacant lot" }
                }
                @if listing.flagged {
                    span class="tag tag-flagged" { "Flagged" }
                }
            }

            @if let Some(subject) = &listing.email_subject {
                div class="card-source" {
                    p { "Source: " (subject) }
                    @if let Some(sender) = &listing.email_sender {
                        p class="sender" { (sender) }
                    }
                }
            }
        }
    }
}
