//! The per-connection stream loop.
//!
//! Each connection polls, writes its frames, flushes, then sleeps for the
//! configured delay. Nothing is shared between connections except the
//! process-wide [`StreamMetrics`] counters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use breakerboard_core::error::AppError;

use crate::frame;
use crate::metrics::StreamMetrics;
use crate::poller::MetricsPoller;
use crate::snapshot::CommandSnapshot;

/// The client side of the stream went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stream sink closed")]
pub struct SinkClosed;

/// Destination of encoded frames.
#[async_trait]
pub trait FrameSink: Send {
    /// Queue one frame for the client.
    async fn write_frame(&mut self, frame: Bytes) -> Result<(), SinkClosed>;

    /// Push queued frames out before the loop sleeps.
    async fn flush(&mut self) -> Result<(), SinkClosed> {
        Ok(())
    }
}

#[async_trait]
impl FrameSink for mpsc::Sender<Bytes> {
    async fn write_frame(&mut self, frame: Bytes) -> Result<(), SinkClosed> {
        mpsc::Sender::send(self, frame).await.map_err(|_| SinkClosed)
    }

    async fn flush(&mut self) -> Result<(), SinkClosed> {
        if self.is_closed() {
            return Err(SinkClosed);
        }
        Ok(())
    }
}

/// Why a stream loop ended.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The cancellation token fired.
    Cancelled,
    /// The client stopped reading.
    Disconnected,
    /// A tick failed in a way that cannot be retried.
    Failed(AppError),
}

/// Stream loop shared by all connections.
#[derive(Debug, Clone)]
pub struct MetricsStream {
    poller: Arc<dyn MetricsPoller>,
    delay: Duration,
    metrics: Arc<StreamMetrics>,
}

impl MetricsStream {
    /// Create a stream over `poller` ticking every `delay`.
    pub fn new(poller: Arc<dyn MetricsPoller>, delay: Duration, metrics: Arc<StreamMetrics>) -> Self {
        Self {
            poller,
            delay,
            metrics,
        }
    }

    /// Same stream with a different tick delay.
    pub fn with_delay(&self, delay: Duration) -> Self {
        Self {
            delay,
            ..self.clone()
        }
    }

    /// Delay between ticks.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run until the client disconnects, `cancel` fires or a tick fails.
    pub async fn run(&self, sink: &mut impl FrameSink, cancel: CancellationToken) -> StreamOutcome {
        loop {
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return StreamOutcome::Cancelled,
                polled = self.poller.stats_for_commands_running() => polled,
            };

            let stats = match polled {
                Ok(stats) => stats,
                Err(e) => {
                    error!(error = %e, "Poll tick failed, closing stream");
                    return StreamOutcome::Failed(e);
                }
            };

            if let Err(outcome) = self.emit(sink, &stats).await {
                return outcome;
            }
            self.metrics.record_tick();

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return StreamOutcome::Cancelled,
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }

    async fn emit(&self, sink: &mut impl FrameSink, stats: &[CommandSnapshot]) -> Result<(), StreamOutcome> {
        if stats.is_empty() {
            self.write(sink, frame::ping()).await?;
            self.metrics.record_ping_frame();
        } else {
            for snapshot in stats {
                let data = frame::data(snapshot).map_err(StreamOutcome::Failed)?;
                self.write(sink, data).await?;
                self.metrics.record_data_frame();
            }
        }

        sink.flush().await.map_err(|_| self.disconnected())
    }

    async fn write(&self, sink: &mut impl FrameSink, frame: Bytes) -> Result<(), StreamOutcome> {
        sink.write_frame(frame).await.map_err(|_| self.disconnected())
    }

    fn disconnected(&self) -> StreamOutcome {
        self.metrics.record_write_failure();
        debug!("Stream client disconnected");
        StreamOutcome::Disconnected
    }
}
