pub mod admin_logs;
pub mod email_tokens;
pub mod leaderboards;
pub mod replays;
pub mod scores;
pub mod sessions;
pub mod songs;
pub mod users;
