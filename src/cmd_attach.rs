//! `bite attach`: drive an in-memory page from a running companion.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use bite_companion_http::{HttpCompanion, SseCommandSource};
use bite_config::Config;
use bite_core::{DesktopNotifier, LogNotifier, Outbox, SyncEngine, SyncSession};
use bite_page_memory::PageFixture;
use bite_protocols::{Command, ContentPayload, Inbound, Notifier};

pub(crate) async fn run_attach(
    config: &Config,
    page: &Path,
    push_content: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = Arc::new(PageFixture::load(page)?.into_page()?);
    info!("Loaded page with {} section(s)", page.sections().len());

    let http = Arc::new(HttpCompanion::new(config.companion.clone())?);
    let outbox = Arc::new(Outbox::spawn(http, &config.outbox));
    let engine = Arc::new(SyncEngine::new(
        page.clone(),
        outbox.clone(),
        &config.engine,
    ));
    let source = Arc::new(SseCommandSource::new(&config.companion)?);
    let notifier: Arc<dyn Notifier> = if config.session.desktop_notifications {
        Arc::new(DesktopNotifier::new("bite"))
    } else {
        Arc::new(LogNotifier)
    };
    let session = SyncSession::new(engine.clone(), source, outbox.clone())
        .with_notifier(notifier)
        .with_config(&config.session);

    session.open().await?;
    if push_content {
        engine
            .handle_command(Inbound::new(Command::FetchContent { callback: None }))
            .await;
    }

    tokio::select! {
        exit = session.wait() => {
            if let Some(exit) = exit {
                info!("Push session {}", exit);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, closing push session");
            session.close().await;
        }
    }

    outbox.close().await;
    let stats = outbox.stats();
    info!(
        "Pushes: {} delivered, {} failed, {} retried, {} dropped",
        stats.delivered(),
        stats.failed(),
        stats.retried(),
        stats.dropped()
    );

    let document = engine.snapshot().await;
    let payload = ContentPayload::from_document(&document, None);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
