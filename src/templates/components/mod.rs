pub mod countdown;
pub mod details_panel;
pub mod editor_form;
pub mod email_cta;
pub mod filter_panel;
pub mod listing_card;
pub mod source_emails;

// Re-exports for convenience
pub use countdown::countdown_badge;
pub use email_cta::email_cta_form;
