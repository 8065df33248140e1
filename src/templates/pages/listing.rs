use chrono::{DateTime, Utc};
use maud::{html, Markup};

use crate::domain::listing::{DetailsPayload, Listing};
use crate::templates::components::countdown_badge;
use crate::templates::components::details_panel::details_panel;
use crate::templates::components::editor_form::{editor_form, EditorVm};
use crate::templates::components::source_emails::{source_emails, SourceEmail};
use crate::templates::desktop_layout;

pub struct ListingPageVm<'a> {
    pub listing: &'a Listing,
    pub details: Option<&'a DetailsPayload>,
    pub emails: &'a [SourceEmail],
    pub editor: EditorVm<'a>,
    pub now: DateTime<Utc>,
}

pub fn listing_page(vm: &ListingPageVm) -> Markup {
    let l = vm.listing;
    desktop_layout(
        l.address_label(),
        true,
        html! {
            main class="container wide" {
                div class="listing-header" {
                    a href="/dashboard" class="back" { "← Back to listings" }
                    h1 { (l.address_label()) }
                    div class="listing-subhead" {
                        span { (l.neighborhood.as_deref().unwrap_or("Neighborhood not available")) }
                        span class="dot" { "•" }
                        @match l.total_units {
                            Some(units) => { span { (units) " Total Units" } }
                            None => { span { "Units unknown" } }
                        }
                        span class="dot" { "•" }
                        (countdown_badge(l.time_sent_tz, vm.now))
                        @if l.flagged {
                            span class="tag tag-flagged" { "Flagged for review" }
                        }
                    }
                }

                div class="listing-panes" {
                    // Left pane: source materials
                    section class="pane pane-left" {
                        h3 { "Source Materials" }
                        (source_emails(vm.emails))
                    }

                    // Right pane: editor + sensitive details
                    section class="pane pane-right" {
                        (editor_form(&vm.editor))
                        (details_panel(vm.details))
                    }
                }
            }
        },
    )
}
