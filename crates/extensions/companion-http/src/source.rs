//! Inbound commands over `text/event-stream`.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{Client, header};
use tracing::{debug, info};

use bite_config::CompanionConfig;
use bite_protocols::{CommandSource, CommandStream, Inbound, TransportError};

use crate::decoder::SseDecoder;

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;

/// [`CommandSource`] that opens one `GET {sse_url}` per subscription.
///
/// The stream holds the connection; dropping it disconnects.
pub struct SseCommandSource {
    client: Client,
    url: String,
}

impl SseCommandSource {
    pub fn new(config: &CompanionConfig) -> Result<Self, TransportError> {
        // No overall timeout: a subscription is long-lived.
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: config.sse_url(),
        })
    }
}

#[async_trait]
impl CommandSource for SseCommandSource {
    async fn subscribe(&self) -> Result<CommandStream, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        info!("Subscribed to {}", self.url);
        Ok(decode_events(response.bytes_stream().boxed()))
    }
}

struct EventState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    finished: bool,
}

fn decode_events(body: BoxStream<'static, reqwest::Result<Bytes>>) -> CommandStream {
    let state = EventState {
        body,
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(data) = state.ready.pop_front() {
                debug!("Push event: {}", data);
                let item = Inbound::decode(&data).map_err(TransportError::from);
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => state.ready.extend(state.decoder.feed(&chunk)),
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(TransportError::Stream(e.to_string())), state));
                }
                None => {
                    state.finished = true;
                    state.ready.extend(state.decoder.finish());
                }
            }
        }
    }))
}
