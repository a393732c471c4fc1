pub mod actions;
pub mod brevo_api;
