//! # breakerboard-stream
//!
//! Discovers the commands active in the shared counter store and streams
//! their metrics snapshots to dashboard viewers.
//!
//! One poll tick runs these stages in order:
//!
//! 1. [`scanner`] lists the store and drops expired or malformed entries
//! 2. [`window`] keeps the commands still inside their rolling window
//! 3. [`assembler`] turns each command into a [`snapshot::CommandSnapshot`]
//!
//! [`server::MetricsStream`] repeats the tick for each connected client.

pub mod assembler;
pub mod frame;
pub mod metrics;
pub mod poller;
pub mod provider;
pub mod resolver;
pub mod scanner;
pub mod server;
pub mod snapshot;
pub mod window;

pub use assembler::SnapshotAssembler;
pub use metrics::{ActiveStreamGuard, StreamMetrics, StreamMetricsSnapshot};
pub use poller::{MetricsPoller, StorePoller};
pub use resolver::ConfigResolver;
pub use scanner::CounterStoreScanner;
pub use server::{FrameSink, MetricsStream, SinkClosed, StreamOutcome};
pub use snapshot::CommandSnapshot;
pub use window::WindowMembershipFilter;
