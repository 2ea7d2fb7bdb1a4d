use crate::common::config::AppConfig;
use crate::common::error::ServiceResult;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{info, warn};

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

#[derive(Serialize)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// In dev mode mails are only logged; otherwise they are posted to the
/// configured relay endpoint.
pub async fn send(config: &AppConfig, mail: Mail) -> ServiceResult<()> {
    if config.dev_mode {
        info!(to = mail.to, subject = mail.subject, "{}", mail.text);
        return Ok(());
    }
    let Some(relay_url) = config.mail_relay_url.as_ref() else {
        warn!(to = mail.to, subject = mail.subject, "Mail relay url not set");
        return Ok(());
    };
    CLIENT
        .post(relay_url)
        .json(&mail)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

pub async fn send_verification(config: &AppConfig, email: &str, token: &str) -> ServiceResult<()> {
    let link = format!("{}/user/register/{token}", config.frontend_base_url);
    send(
        config,
        Mail {
            to: email.to_owned(),
            subject: "Confirm your email".to_owned(),
            text: format!("Confirm your email: {link}\nThis link expires in 60 minutes."),
        },
    )
    .await
}

pub async fn send_reset(config: &AppConfig, email: &str, token: &str) -> ServiceResult<()> {
    let link = format!("{}/user/passwordReset/{token}", config.frontend_base_url);
    send(
        config,
        Mail {
            to: email.to_owned(),
            subject: "Reset your password".to_owned(),
            text: format!(
                "Reset your password: {link}\nIf you didn't request this, you can ignore this email. The link expires in 30 minutes."
            ),
        },
    )
    .await
}
