//! In-memory ledger handler for development and testing

use async_trait::async_trait;
use parking_lot::Mutex;
use review_core::{
    LedgerError, LedgerReadEffects, LedgerReview, LedgerUint, LedgerWriteEffects, ProductId,
    ReviewSubmission,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::debug;

/// Ledger clock returning seconds since the epoch
pub type LedgerClock = Arc<dyn Fn() -> u128 + Send + Sync>;

#[derive(Debug, Default)]
struct FaultPlan {
    fail_writes: bool,
    fail_reads: bool,
    pending_write_failures: u32,
}

/// Append-only in-memory ledger
///
/// Clones share the same entries and fault plan.
#[derive(Clone)]
pub struct MemoryLedgerHandler {
    entries: Arc<RwLock<Vec<LedgerReview>>>,
    faults: Arc<Mutex<FaultPlan>>,
    write_attempts: Arc<AtomicU64>,
    write_latency: Option<Duration>,
    clock: LedgerClock,
}

impl MemoryLedgerHandler {
    /// Create an empty ledger stamped with the system clock
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            faults: Arc::new(Mutex::new(FaultPlan::default())),
            write_attempts: Arc::new(AtomicU64::new(0)),
            write_latency: None,
            clock: Arc::new(system_clock_secs),
        }
    }

    /// Delay every write by `latency` before it is applied
    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = Some(latency);
        self
    }

    /// Stamp entries using a custom clock
    pub fn with_clock(mut self, clock: LedgerClock) -> Self {
        self.clock = clock;
        self
    }

    /// Fail the next `count` writes, then recover
    pub fn fail_next_writes(&self, count: u32) {
        self.faults.lock().pending_write_failures = count;
    }

    /// Fail every write until cleared
    pub fn set_write_failure(&self, fail: bool) {
        self.faults.lock().fail_writes = fail;
    }

    /// Fail every read until cleared
    pub fn set_read_failure(&self, fail: bool) {
        self.faults.lock().fail_reads = fail;
    }

    /// All recorded entries, in append order (for testing)
    pub async fn entries(&self) -> Vec<LedgerReview> {
        self.entries.read().await.clone()
    }

    /// Number of write attempts, failed ones included (for testing)
    pub fn write_attempts(&self) -> u64 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn take_write_fault(&self) -> bool {
        let mut faults = self.faults.lock();
        if faults.pending_write_failures > 0 {
            faults.pending_write_failures -= 1;
            return true;
        }
        faults.fail_writes
    }
}

impl Default for MemoryLedgerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryLedgerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLedgerHandler")
            .field("write_attempts", &self.write_attempts())
            .field("write_latency", &self.write_latency)
            .finish_non_exhaustive()
    }
}

fn system_clock_secs() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u128::from(d.as_secs()))
        .unwrap_or(0)
}

#[async_trait]
impl LedgerWriteEffects for MemoryLedgerHandler {
    async fn add_review(&self, submission: &ReviewSubmission) -> Result<(), LedgerError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.write_latency {
            tokio::time::sleep(latency).await;
        }
        if self.take_write_fault() {
            return Err(LedgerError::unavailable("injected write failure"));
        }

        let entry = LedgerReview {
            user_id: submission.user_id.to_string(),
            product_id: submission.product_id.to_string(),
            rating: LedgerUint::from(submission.rating.value()),
            comment: submission.comment.clone(),
            timestamp: LedgerUint((self.clock)()),
        };
        let mut entries = self.entries.write().await;
        entries.push(entry);
        debug!(entries = entries.len(), "memory ledger appended review");
        Ok(())
    }
}

#[async_trait]
impl LedgerReadEffects for MemoryLedgerHandler {
    async fn reviews_by_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<LedgerReview>, LedgerError> {
        let fail_reads = self.faults.lock().fail_reads;
        if fail_reads {
            return Err(LedgerError::unavailable("injected read failure"));
        }
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.product_id == product_id.as_str())
            .cloned()
            .collect())
    }
}
