//! One-shot helpers: `bite send` and `bite outline`.

use std::path::Path;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use bite_companion_server::render_outline;
use bite_config::Config;
use bite_protocols::{ContentPayload, Inbound};

/// Queue one push message on a running companion.
pub(crate) async fn run_send(
    config: &Config,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value: Value = serde_json::from_str(message)?;
    let inbound = Inbound::from_value(value.clone())?;
    debug!("Sending '{}'", inbound.command.action());

    let client = Client::builder().timeout(config.companion.timeout()).build()?;
    let response = client
        .post(config.companion.endpoint("/commands"))
        .header("Content-Type", "application/json")
        .body(value.to_string())
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(format!("Companion returned {}: {}", status, body).into());
    }
    info!("Queued '{}': {}", inbound.command.action(), body);
    Ok(())
}

/// Print a content payload file as a Markdown outline.
pub(crate) fn run_outline(config: &Config, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(file)?;
    let payload: ContentPayload = serde_json::from_str(&text)?;
    print!("{}", render_outline(&payload, &config.server.outline_keys));
    Ok(())
}
