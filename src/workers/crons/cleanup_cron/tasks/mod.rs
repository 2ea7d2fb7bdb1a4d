pub mod cleanup_email_tokens;
