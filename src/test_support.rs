//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ratatui::text::Text;
use tokio::sync::Notify;

use crate::error::RenderError;
use crate::host::{ActiveDocument, MarkupRenderer};
use crate::plugins::PluginContext;
use crate::workbench::Workbench;

/// Renders markup verbatim, one line per input line.
#[derive(Default)]
pub struct EchoRenderer {
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    yield_first: bool,
}

impl EchoRenderer {
    /// Renderer that returns immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that yields to the scheduler once before rendering.
    pub fn yielding() -> Self {
        Self {
            yield_first: true,
            ..Self::default()
        }
    }

    /// Renderer that waits for `gate` before rendering.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Number of render calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarkupRenderer for EchoRenderer {
    async fn render(
        &self,
        markup: &str,
        _source_path: &str,
        target: &mut Text<'static>,
    ) -> Result<(), RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_first {
            tokio::task::yield_now().await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        for line in markup.lines() {
            target.push_line(line.to_string());
        }
        Ok(())
    }
}

/// Writes partial output, then fails.
pub struct FailingRenderer;

#[async_trait]
impl MarkupRenderer for FailingRenderer {
    async fn render(
        &self,
        _markup: &str,
        source_path: &str,
        target: &mut Text<'static>,
    ) -> Result<(), RenderError> {
        target.push_line("partial");
        Err(RenderError::Resource(format!("embed missing for {source_path}")))
    }
}

/// Everything a panel needs, backed by in-memory doubles.
pub struct Harness {
    pub workbench: Arc<Workbench>,
    pub documents: Arc<ActiveDocument>,
    pub context: PluginContext,
}

impl Harness {
    /// Build a harness around `renderer` with an 800x600 viewport.
    pub fn new(renderer: Arc<dyn MarkupRenderer>) -> Self {
        let workbench = Arc::new(Workbench::default());
        workbench.set_viewport(ratatui::layout::Rect::new(0, 0, 800, 600));
        let documents = Arc::new(ActiveDocument::new());
        let context = PluginContext::new(documents.clone(), renderer, workbench.clone());
        Self {
            workbench,
            documents,
            context,
        }
    }
}
