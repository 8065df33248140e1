use maud::{html, Markup};

use crate::domain::filter::{FilterSpec, UnitBucket};

/// Filter controls for the dashboard. Plain GET form: the query string is
/// the whole filter state, rebuilt per request.
pub fn filter_panel(spec: &FilterSpec, neighborhoods: &[String]) -> Markup {
    html! {
        form class="card filter-panel" method="get" action="/dashboard" {
            div class="filter-row" {
                label class="sr-only" for="q" { "Search" }
                input
                    type="text"
                    id="q"
                    name="q"
                    value=(spec.query)
                    placeholder="Search address, email subject, or sender...";
            }

            div class="filter-row" {
                span class="filter-label" { "Neighborhood:" }
                div class="checkbox-row" {
                    @for name in neighborhoods {
                        label class="checkbox" {
                            input
                                type="checkbox"
                                name="neighborhood"
                                value=(name)
                                checked[spec.neighborhoods.iter().any(|n| n == name)];
                            (name)
                        }
                    }
                }
            }

            div class="filter-row" {
                label class="filter-label" for="units" { "Units:" }
                select name="units" id="units" {
                    option value="" selected[spec.unit_bucket.is_none()] { "Any size" }
                    @for bucket in UnitBucket::ALL {
                        option
                            value=(bucket.code())
                            selected[spec.unit_bucket == Some(bucket)]
                        { (bucket.label()) }
                    }
                }
            }

            div class="filter-row" {
                label class="checkbox" {
                    input type="checkbox" name="active" value="1" checked[spec.show_active];
                    "Only active notice windows"
                }
                label class="filter-label" for="days_left" { "with at least" }
                input
                    type="number"
                    id="days_left"
                    name="days_left"
                    min="1"
                    max="5"
                    value=(spec.min_days_left);
                span { "days left" }
            }

            div class="filter-row" {
                label class="checkbox" {
                    input type="checkbox" name="flagged" value="1" checked[spec.flagged];
                    "Flagged for review"
                }
            }

            div class="filter-row actions" {
                button type="submit" class="primary" { "Apply filters" }
                a href="/dashboard" class="clear-filters" { "Clear all filters" }
            }
        }
    }
}
