//! Ledger handler selection

use crate::api::SharedLedger;
use crate::config::{LedgerBackend, ServerConfig};
use review_core::LedgerError;
use review_effects::{HttpLedgerHandler, MemoryLedgerHandler};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the ledger handler named by the configuration
pub fn build_ledger(config: &ServerConfig) -> Result<SharedLedger, LedgerError> {
    match config.ledger.backend {
        LedgerBackend::Memory => {
            warn!("using in-memory ledger; reviews are lost on restart");
            let ledger: SharedLedger = Arc::new(MemoryLedgerHandler::new());
            Ok(ledger)
        }
        LedgerBackend::Http => {
            let endpoint = config
                .ledger
                .endpoint
                .as_deref()
                .ok_or_else(|| LedgerError::unavailable("no ledger endpoint configured"))?;
            let handler = HttpLedgerHandler::new(endpoint, config.ledger_timeout())?;
            info!(endpoint = %handler.endpoint(), "using HTTP ledger gateway");
            let ledger: SharedLedger = Arc::new(handler);
            Ok(ledger)
        }
    }
}
