pub mod admin;
pub mod instruments;
pub mod leaderboards;
pub mod modifiers;
pub mod replays;
pub mod replies;
pub mod scores;
pub mod songdata;
pub mod songs;
pub mod users;
