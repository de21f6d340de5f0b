//! Background return of overdue borrowings
//!
//! The sweep runs once at start-up and then on a fixed interval until its
//! cancellation token fires. Each pass is a single transaction, so a failing
//! row discards the whole pass; the next tick tries again.
//!
//! There is no coordination between processes: every server instance runs
//! its own sweeper. Rows are flipped with a conditional update, so two
//! concurrent passes never return the same borrowing twice.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::loans::LoansService;

/// Periodic task returning overdue borrowings
pub struct OverdueSweeper {
    loans: LoansService,
    interval: Duration,
}

impl OverdueSweeper {
    pub fn new(loans: LoansService, interval: Duration) -> Self {
        Self { loans, interval }
    }

    /// Runs a single pass, returning the number of borrowings reclaimed
    pub async fn run_once(&self) -> usize {
        match self.loans.return_overdue().await {
            Ok(0) => {
                debug!("Overdue sweep found nothing to return");
                0
            }
            Ok(reclaimed) => {
                info!(reclaimed, "Overdue sweep returned borrowings");
                reclaimed
            }
            Err(e) => {
                warn!(error = %e, "Overdue sweep failed, pass rolled back");
                0
            }
        }
    }

    /// Starts the sweeper as a background tokio task.
    ///
    /// The task exits once `shutdown` is cancelled.
    pub fn start(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = self.interval.as_secs(), "Overdue sweeper started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                self.run_once().await;
            }

            info!("Overdue sweeper stopped");
        })
    }
}
