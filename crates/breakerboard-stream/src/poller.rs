//! One poll tick: store listing to per-command snapshots.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use breakerboard_core::result::AppResult;
use breakerboard_core::traits::{Clock, CounterStore};

use crate::assembler::SnapshotAssembler;
use crate::resolver::ConfigResolver;
use crate::scanner::CounterStoreScanner;
use crate::snapshot::CommandSnapshot;
use crate::window::WindowMembershipFilter;

/// Produces the snapshots of every running command for one tick.
#[async_trait]
pub trait MetricsPoller: Send + Sync + std::fmt::Debug + 'static {
    /// Snapshots of the commands running right now, one per command key.
    async fn stats_for_commands_running(&self) -> AppResult<Vec<CommandSnapshot>>;
}

/// [`MetricsPoller`] reading the shared counter store.
#[derive(Debug)]
pub struct StorePoller {
    store: Arc<dyn CounterStore>,
    scanner: CounterStoreScanner,
    filter: WindowMembershipFilter,
    resolver: Arc<ConfigResolver>,
    assembler: SnapshotAssembler,
    clock: Arc<dyn Clock>,
}

impl StorePoller {
    /// Create a poller.
    pub fn new(
        store: Arc<dyn CounterStore>,
        scanner: CounterStoreScanner,
        resolver: Arc<ConfigResolver>,
        assembler: SnapshotAssembler,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            scanner,
            filter: WindowMembershipFilter::new(Arc::clone(&resolver)),
            resolver,
            assembler,
            clock,
        }
    }

    /// Command keys running at this instant.
    ///
    /// A failed store read is treated as an empty store for this tick.
    pub async fn commands_running(&self) -> AppResult<Vec<String>> {
        let now_secs = self.clock.now_secs();

        let entries = match self.store.entries(self.scanner.prefix()).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Counter store read failed, treating tick as idle");
                return Ok(Vec::new());
            }
        };

        self.filter
            .commands_running(self.scanner.scan(&entries, now_secs), now_secs)
    }
}

#[async_trait]
impl MetricsPoller for StorePoller {
    async fn stats_for_commands_running(&self) -> AppResult<Vec<CommandSnapshot>> {
        let commands = self.commands_running().await?;
        debug!(count = commands.len(), "Commands running");

        let mut snapshots = Vec::with_capacity(commands.len());
        for command_key in &commands {
            let config = self.resolver.resolve(command_key);
            snapshots.push(self.assembler.assemble(command_key, &config).await);
        }

        Ok(snapshots)
    }
}
