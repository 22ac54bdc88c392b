//! The sync protocol engine.
//!
//! Translates between the live page and the wire protocol. Every command has
//! a defined effect, and nothing a handler does escapes
//! [`SyncEngine::handle_command`]: failures become diagnostics.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use bite_config::EngineConfig;
use bite_protocols::{
    Affordance, Bounds, Command, Companion, Edge, Inbound, LogLevel, PageAdapter, Patch,
    PatchReport, Push, SliceHandle, TranscriptDocument,
};

use crate::error::EngineError;
use crate::reconcile::{Reconciliation, reconcile};
use crate::speed::SpeedLadder;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

/// Whether the session should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Sync engine over one page and one companion.
pub struct SyncEngine {
    page: Arc<dyn PageAdapter>,
    companion: Arc<dyn Companion>,
    ladder: SpeedLadder,
    tolerance: f64,
    stale_callback: String,
}

impl SyncEngine {
    pub fn new(
        page: Arc<dyn PageAdapter>,
        companion: Arc<dyn Companion>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            page,
            companion,
            ladder: SpeedLadder::new(config.speed_levels.clone()),
            tolerance: config.bounds_tolerance,
            stale_callback: config.stale_slice_callback.clone(),
        }
    }

    /// Read the whole document from the page.
    ///
    /// A section that cannot be read is skipped and logged.
    pub async fn snapshot(&self) -> TranscriptDocument {
        let count = self.page.section_count().await;
        let mut document = TranscriptDocument::new();
        for index in 0..count {
            match self.page.read_section(index).await {
                Ok(section) => {
                    if let Err(e) = document.push(section) {
                        warn!("Skipping section #{}: {}", index, e);
                    }
                }
                Err(e) => warn!("Skipping section #{}: {}", index, e),
            }
        }
        document
    }

    /// Read only labels and bounds, with the same skip rule as [`Self::snapshot`].
    pub async fn bounds_snapshot(&self) -> Vec<(String, Bounds)> {
        let count = self.page.section_count().await;
        let mut bounds: Vec<(String, Bounds)> = Vec::with_capacity(count);
        for index in 0..count {
            let read = async {
                let label = self.page.read_label(index).await?;
                let b = self.page.read_bounds(index).await?;
                Ok::<_, EngineError>((label, b))
            };
            match read.await {
                Ok((label, _)) if bounds.iter().any(|(l, _)| *l == label) => {
                    warn!("Skipping section #{}: duplicate label {}", index, label);
                }
                Ok(entry) => bounds.push(entry),
                Err(e) => warn!("Skipping bounds of section #{}: {}", index, e),
            }
        }
        bounds
    }

    /// Write every text in `patch` whose label and key exist on the page,
    /// firing the page's edit notification for each one.
    pub async fn apply_patch(&self, patch: &Patch) -> PatchReport {
        let mut report = PatchReport::default();
        if patch.is_empty() {
            return report;
        }

        let positions = self.label_positions().await;
        for (label, texts) in patch.iter() {
            let Some(&index) = positions.get(label.as_str()) else {
                report.dropped_labels.push(label.clone());
                continue;
            };
            for (key, text) in texts {
                match self.page.write_subsection(index, key, text).await {
                    Ok(()) => {
                        report.applied += 1;
                        if let Err(e) = self.page.notify_edited(index, key).await {
                            warn!("Edit notification for {}/{} failed: {}", label, key, e);
                        }
                    }
                    Err(e) => {
                        debug!("Dropping {}/{}: {}", label, key, e);
                        report.dropped_keys.push((label.clone(), key.clone()));
                    }
                }
            }
        }

        if !report.is_clean() {
            debug!(
                "Patch applied {} field(s), dropped labels {:?}, dropped keys {:?}",
                report.applied, report.dropped_labels, report.dropped_keys
            );
        }
        report
    }

    /// Run one inbound message. Never fails; returns [`Flow::Stop`] only for
    /// a session close.
    pub async fn handle_command(&self, inbound: Inbound) -> Flow {
        let Inbound { command, patch } = inbound;
        debug!("Handling action {}", command.action());

        let flow = match self.execute(&command).await {
            Ok(flow) => flow,
            Err(e) => {
                self.diagnostic(LogLevel::Error, format!("{} failed: {}", command.action(), e))
                    .await;
                Flow::Continue
            }
        };

        if flow == Flow::Continue {
            if let Some(patch) = patch {
                self.apply_patch(&patch).await;
            }
        }
        flow
    }

    async fn execute(&self, command: &Command) -> Result<Flow, EngineError> {
        match command {
            Command::Play { section } => {
                let index = self
                    .locate(section)
                    .await
                    .ok_or_else(|| EngineError::SectionNotFound(section.clone()))?;
                self.page.trigger(&Affordance::PlaySection(index)).await?;
            }
            Command::Toggle => self.page.trigger(&Affordance::TransportToggle).await?,
            Command::Back { count } => self.step_back(count.unwrap_or(1)).await?,
            Command::Put { data } => {
                self.apply_patch(data).await;
            }
            Command::InitTranscripts => self.init_transcripts().await,
            Command::PushSlice {
                section,
                edge,
                x,
                section_edge_pos,
            } => self.push_slice(section, *edge, *x, section_edge_pos).await?,
            Command::FetchSlice { callback } => {
                let bounds = self.bounds_snapshot().await;
                self.send(Push::Slice {
                    bounds,
                    callback: callback.clone(),
                })
                .await;
            }
            Command::FetchContent { callback } => self.fetch_content(callback.clone()).await,
            Command::FetchProgress { callback } => {
                let x = self.page.read_playhead().await?;
                self.send(Push::Progress {
                    x,
                    callback: callback.clone(),
                })
                .await;
            }
            Command::Speed { offset } => self.change_speed(*offset).await?,
            Command::CloseSession => return Ok(Flow::Stop),
            Command::Unknown { action } => {
                self.diagnostic(LogLevel::Error, format!("Unrecognized action: {}", action))
                    .await;
            }
        }
        Ok(Flow::Continue)
    }

    async fn step_back(&self, count: u32) -> Result<(), EngineError> {
        self.diagnostic(LogLevel::Info, format!("Stepping back {} time(s)", count))
            .await;
        for _ in 0..count {
            self.page.trigger(&Affordance::StepBack).await?;
        }
        Ok(())
    }

    async fn init_transcripts(&self) {
        let count = self.page.section_count().await;
        for index in 0..count {
            if let Err(e) = self
                .page
                .trigger(&Affordance::GenerateTranscript(index))
                .await
            {
                warn!("Cannot generate transcript of section #{}: {}", index, e);
            }
        }
        self.fetch_content(None).await;
    }

    async fn fetch_content(&self, callback: Option<String>) {
        let document = self.snapshot().await;
        self.send(Push::Content { document, callback }).await;
    }

    /// Move one edge of a section, but only if the sender's view of the
    /// timeline is still current. On a stale view a fresh bounds snapshot
    /// is pushed so the sender can retry.
    async fn push_slice(
        &self,
        section: &str,
        edge: Edge,
        x: f64,
        expected: &BTreeMap<String, Bounds>,
    ) -> Result<(), EngineError> {
        let current = self.bounds_snapshot().await;
        match reconcile(&current, expected, section, self.tolerance) {
            Reconciliation::Fresh { index, current } => {
                let from = current.edge(edge);
                let handle = SliceHandle {
                    section: index,
                    edge,
                };
                self.page.simulate_drag(&handle, from, x).await?;
                info!("Moved {} of section {} from {} to {}", edge, section, from, x);
                Ok(())
            }
            stale => {
                self.send(Push::Slice {
                    bounds: current,
                    callback: Some(self.stale_callback.clone()),
                })
                .await;
                Err(EngineError::StaleSlice {
                    section: section.to_string(),
                    detail: stale.describe(),
                })
            }
        }
    }

    async fn change_speed(&self, offset: i64) -> Result<(), EngineError> {
        let current = self.page.read_speed().await?;
        let next = self.ladder.step(&current, offset)?.to_string();
        self.page
            .trigger(&Affordance::SelectSpeed(next.clone()))
            .await?;
        self.diagnostic(LogLevel::Info, format!("Speed: {}", next))
            .await;
        Ok(())
    }

    async fn locate(&self, label: &str) -> Option<usize> {
        let count = self.page.section_count().await;
        for index in 0..count {
            if matches!(self.page.read_label(index).await, Ok(l) if l == label) {
                return Some(index);
            }
        }
        None
    }

    async fn label_positions(&self) -> BTreeMap<String, usize> {
        let count = self.page.section_count().await;
        let mut positions = BTreeMap::new();
        for index in 0..count {
            match self.page.read_label(index).await {
                Ok(label) => {
                    positions.entry(label).or_insert(index);
                }
                Err(e) => debug!("Section #{} has no readable label: {}", index, e),
            }
        }
        positions
    }

    /// Log locally and forward to the companion log sink.
    pub async fn diagnostic(&self, level: LogLevel, msg: impl Into<String>) {
        let msg = msg.into();
        match level {
            LogLevel::Info => info!("{}", msg),
            LogLevel::Error => error!("{}", msg),
        }
        if let Err(e) = self.companion.push(Push::log(level, msg)).await {
            warn!("Cannot forward diagnostic: {}", e);
        }
    }

    async fn send(&self, push: Push) {
        let path = push.path();
        match self.companion.push(push).await {
            Ok(receipt) => debug!("{} -> {} {}", path, receipt.status, receipt.body),
            Err(e) => warn!("Push to {} failed: {}", path, e),
        }
    }
}
