use chrono::{DateTime, Utc};
use maud::{html, Markup};

use crate::domain::countdown::{countdown_label, days_remaining, CountdownStatus};

/// Notice-window badge: "Past COPA", "1 day left", "{n} days left", or a
/// muted marker when the notice date is unknown. Recomputed on every
/// render; the caller supplies `now`.
pub fn countdown_badge(time_sent_tz: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Markup {
    match days_remaining(time_sent_tz, now) {
        None => html! {
            span class="badge badge-unknown" { "No notice date" }
        },
        Some(remaining) => {
            let status = CountdownStatus::classify(remaining);
            html! {
                span class=(status.css_class()) { (countdown_label(remaining)) }
            }
        }
    }
}
