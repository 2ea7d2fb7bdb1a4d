pub mod admin_logs;
pub mod email_tokens;
pub mod scores;
pub mod songs;
pub mod users;
