use crate::common::config::AppConfig;
use crate::common::error::ServiceResult;
use discord_webhook2::message::Message;
use discord_webhook2::webhook::DiscordWebhook;
use iso8061_timestamp::Timestamp;

const INFO_COLOR: u32 = 0x6611FF;

/// Audit trail mirror: every admin action lands in the configured Discord
/// channel as well as in `admin_logs`.
pub async fn admin_action(config: &AppConfig, title: &str, description: &str) -> ServiceResult<()> {
    send(config, title, description, INFO_COLOR).await
}

pub async fn send(
    config: &AppConfig,
    title: &str,
    description: &str,
    color: u32,
) -> ServiceResult<()> {
    let Some(webhook_url) = config.discord_webhook_url.as_ref() else {
        tracing::warn!(title, description, "Discord Webhook url not set");
        return Ok(());
    };

    let webhook = DiscordWebhook::new(webhook_url)?;
    webhook
        .send(&Message::new(|message| {
            message.embed(|embed| {
                embed
                    .description(description)
                    .author(|author| author.name(title))
                    .color(color)
                    .footer(|footer| footer.text("score-service"))
                    .timestamp(Timestamp::now_utc())
            })
        }))
        .await?;

    Ok(())
}
