use crate::driver::DisplayDriver;
use crate::error::DisplayError;
use crate::pipeline::RenderPipeline;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Waits between cards.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// Real-time pacing on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// The outer loop: compose a deck, push each card to the panel, hold it for
/// `delay`, repeat.
pub struct Slideshow {
    pipeline: RenderPipeline,
    driver: Arc<dyn DisplayDriver>,
    pacer: Arc<dyn Pacer>,
    delay: Duration,
}

impl Slideshow {
    pub fn new(
        pipeline: RenderPipeline,
        driver: Arc<dyn DisplayDriver>,
        pacer: Arc<dyn Pacer>,
        delay: Duration,
    ) -> Self {
        Self {
            pipeline,
            driver,
            pacer,
            delay,
        }
    }

    /// Shows one freshly composed deck. Returns the number of cards shown.
    pub async fn run_cycle(&self) -> Result<usize, DisplayError> {
        let mut shown = 0;
        for card in self.pipeline.compose().await {
            self.driver.show(&card).await?;
            shown += 1;
            self.pacer.pause(self.delay).await;
        }
        Ok(shown)
    }

    /// Runs `cycles` cycles, or forever when `None`. A failed cycle is
    /// logged and followed by the usual delay; it never ends the loop.
    pub async fn run(&self, cycles: Option<usize>) {
        let mut completed = 0usize;
        while cycles.is_none_or(|limit| completed < limit) {
            match self.run_cycle().await {
                Ok(shown) => info!(cycle = completed + 1, cards = shown, "Slideshow cycle finished"),
                Err(e) => {
                    error!(cycle = completed + 1, error = %e, "Slideshow cycle failed");
                    self.pacer.pause(self.delay).await;
                }
            }
            completed += 1;
        }
    }

    pub async fn run_forever(&self) {
        self.run(None).await
    }
}
