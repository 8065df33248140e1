use maud::{html, Markup, PreEscaped};

use crate::db::attachments::AttachmentRow;
use crate::db::emails::EmailRow;
use crate::domain::format::{format_file_size, is_image, is_pdf};

/// One email's attachments, already resolved to signed URLs by the handler.
pub struct AttachmentLink {
    pub row: AttachmentRow,
    pub signed_url: Option<String>,
}

pub struct SourceEmail {
    pub email: EmailRow,
    pub attachments: Vec<AttachmentLink>,
}

/// The "source materials" pane: every inbound email for the listing with
/// its attachments, newest first.
pub fn source_emails(emails: &[SourceEmail]) -> Markup {
    if emails.is_empty() {
        return html! {
            p class="empty" { "No emails found for this property" }
        };
    }

    html! {
        div class="source-emails" {
            @for item in emails {
                div class="email" {
                    h4 { (item.email.subject.as_deref().unwrap_or("(No Subject)")) }
                    div class="email-meta" {
                        p { "From: " (item.email.from_address.as_deref().unwrap_or("Unknown sender")) }
                        @if let Some(received) = &item.email.received_at {
                            p class="timestamp" { (received) }
                        }
                    }

                    // Raw HTML bodies are rendered as text: the dashboard
                    // never executes markup from inbound mail.
                    div class="email-body" {
                        (item.email.raw_text.as_deref()
                            .or(item.email.raw_html.as_deref())
                            .unwrap_or("(No content)"))
                    }

                    @if !item.attachments.is_empty() {
                        div class="attachments" {
                            p class="attachments-header" {
                                "Attachments (" (item.attachments.len()) ")"
                            }
                            @for att in &item.attachments {
                                (attachment_line(att))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn attachment_line(att: &AttachmentLink) -> Markup {
    let icon = file_icon(att.row.content_type.as_deref());
    html! {
        div class="attachment" {
            span class="icon" { (PreEscaped(icon)) }
            div class="attachment-name" {
                @match &att.signed_url {
                    Some(url) => {
                        @if is_pdf(att.row.content_type.as_deref()) || is_image(att.row.content_type.as_deref()) {
                            a href=(url) target="_blank" { (att.row.filename) }
                        } @else {
                            a href=(url) download=(att.row.filename) { (att.row.filename) }
                        }
                    }
                    None => {
                        span { (att.row.filename) }
                    }
                }
                span class="size" { (format_file_size(att.row.file_size)) }
            }
        }
    }
}

fn file_icon(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some(ct) if ct.contains("pdf") => "&#128213;",
        Some(ct) if ct.contains("image") => "&#128444;",
        Some(ct) if ct.contains("word") || ct.contains("document") => "&#128221;",
        Some(ct) if ct.contains("excel") || ct.contains("spreadsheet") => "&#128202;",
        _ => "&#128196;",
    }
}
