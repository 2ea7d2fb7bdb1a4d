pub mod admin_logs;
pub mod email_tokens;
pub mod scores;
pub mod songs;
pub mod users;

/// The unique indexes are the authority on duplicates; repositories surface
/// violations so usecases can map them to conflict errors.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
