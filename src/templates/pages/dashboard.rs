use chrono::{DateTime, Utc};
use maud::{html, Markup};

use crate::domain::filter::FilterSpec;
use crate::domain::listing::Listing;
use crate::templates::components::filter_panel::filter_panel;
use crate::templates::components::listing_card::listing_card;
use crate::templates::desktop_layout;

pub struct DashboardVm {
    pub email: String,
    /// Total rows fetched from the store, before filtering.
    pub total_count: usize,
    /// The filtered subset, in fetch order (newest notice first).
    pub listings: Vec<Listing>,
    pub spec: FilterSpec,
    pub neighborhoods: Vec<String>,
    pub now: DateTime<Utc>,
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        "Dashboard",
        true,
        html! {
            main class="container" {
                div class="dashboard-header" {
                    h1 { "COPA Property Listings" }
                    p class="lead" {
                        "Showing " strong { (vm.listings.len()) }
                        " of " (vm.total_count) " properties"
                    }
                    p class="signed-in" { "Signed in as " strong { (vm.email) } }
                }

                (filter_panel(&vm.spec, &vm.neighborhoods))

                @if vm.listings.is_empty() {
                    div class="card empty-state" {
                        p { "No properties match the current filters." }
                        a href="/dashboard" { "Clear all filters" }
                    }
                } @else {
                    div class="listing-grid" {
                        @for listing in &vm.listings {
                            (listing_card(listing, vm.now))
                        }
                    }
                }
            }
        },
    )
}
