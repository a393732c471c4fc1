pub mod api_messages;
pub mod helpers;
pub mod token;
