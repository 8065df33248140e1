use maud::{html, Markup};

use crate::domain::editor::{EditForm, EditPhase, FieldErrors};
use crate::domain::format::is_auto_populated;
use crate::domain::listing::Listing;

pub struct EditorVm<'a> {
    pub listing_id: &'a str,
    pub phase: EditPhase,
    pub form: &'a EditForm,
    pub errors: &'a FieldErrors,
    /// The stored record the form was opened against; drives the
    /// auto-populated (imported-from-email) field styling.
    pub source: &'a Listing,
    pub neighborhoods: &'a [String],
    /// One-off note, e.g. the outcome of a find-neighborhood lookup.
    pub notice: Option<String>,
}

pub fn editor_form(vm: &EditorVm) -> Markup {
    html! {
        div class="editor" {
            (phase_banner(vm))

            @if let Some(notice) = &vm.notice {
                div class="banner banner-info" { (notice) }
            }

            form method="post" action=(format!("/listings/{}", vm.listing_id)) {
                input type="hidden" name="expected_updated_at" value=(vm.form.expected_updated_at);

                div class="field" {
                    label for="street_address" {
                        "Street Address " span class="required" { "*" }
                    }
                    div class="field-with-button" {
                        input
                            type="text"
                            id="street_address"
                            name="street_address"
                            value=(vm.form.street_address)
                            class=(field_class("street_address", vm));
                        button type="submit" name="action" value="find_neighborhood" class="secondary" {
                            "Find Neighborhood"
                        }
                    }
                    p class="hint" { "“Find Neighborhood” geocodes the address and fills the neighborhood below." }
                    (field_error("street_address", vm.errors))
                }

                div class="field" {
                    label for="neighborhood" { "Neighborhood" }
                    select
                        id="neighborhood"
                        name="neighborhood"
                        class=(field_class("neighborhood", vm))
                    {
                        option value="" selected[vm.form.neighborhood.is_empty()] { "Select a neighborhood..." }
                        @for name in vm.neighborhoods {
                            option value=(name) selected[&vm.form.neighborhood == name] { (name) }
                        }
                    }
                }

                div class="field" {
                    label for="asking_price" { "Asking Price" }
                    input
                        type="text"
                        id="asking_price"
                        name="asking_price"
                        inputmode="numeric"
                        value=(vm.form.asking_price)
                        class=(field_class("asking_price", vm));
                    (field_error("asking_price", vm.errors))
                }

                (unit_field("total_units", "Total Units", &vm.form.total_units, vm))
                (unit_field("residential_units", "Residential Units", &vm.form.residential_units, vm))
                (unit_field("vacant_residential", "Vacant Residential", &vm.form.vacant_residential, vm))
                (unit_field("commercial_units", "Commercial Units", &vm.form.commercial_units, vm))
                (unit_field("vacant_commercial", "Vacant Commercial", &vm.form.vacant_commercial, vm))

                div class="editor-actions" {
                    button type="submit" name="action" value="save" class="primary" { "Save Changes" }
                    a href=(format!("/listings/{}", vm.listing_id)) class="secondary" { "Cancel" }
                }
            }

            div class="legend" {
                span class="swatch auto-populated" {}
                " = Auto-populated from email"
            }
        }
    }
}

fn phase_banner(vm: &EditorVm) -> Markup {
    match vm.phase {
        EditPhase::Saved => html! {
            div class="banner banner-success" { "Changes saved successfully!" }
        },
        EditPhase::Conflict => html! {
            div class="banner banner-conflict" {
                p { "This listing was changed by someone else while you were editing." }
                p {
                    "Your changes were not saved. "
                    a href=(format!("/listings/{}", vm.listing_id)) { "Reload the listing" }
                    " and re-apply them."
                }
            }
        },
        EditPhase::Failed => html! {
            div class="banner banner-error" { "Failed to save changes. Please try again." }
        },
        _ => html! {},
    }
}

fn unit_field(name: &'static str, label: &str, value: &str, vm: &EditorVm) -> Markup {
    html! {
        div class="field" {
            label for=(name) { (label) }
            input
                type="number"
                id=(name)
                name=(name)
                min="0"
                value=(value)
                class=(field_class(name, vm));
            (field_error(name, vm.errors))
        }
    }
}

fn field_class(name: &str, vm: &EditorVm) -> String {
    let mut class = String::from("input");
    if is_auto_populated(name, vm.source) {
        class.push_str(" auto-populated");
    }
    if vm.errors.contains_key(name) {
        class.push_str(" invalid");
    }
    class
}

fn field_error(name: &str, errors: &FieldErrors) -> Markup {
    match errors.get(name) {
        Some(msg) => html! { p class="field-error" { (msg) } },
        None => html! {},
    }
}
