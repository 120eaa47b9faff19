//! In-memory transaction repository.
//!
//! Records are keyed by merchant order number. `update_status` on an unknown
//! order fails with `TransactionNotFound`, matching what a real persistence
//! collaborator reports for an order it never issued. The expected-status
//! check and the write happen under one write guard.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{TransactionRecord, TransactionRepository, TransactionStatus};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionRepository {
    records: Arc<RwLock<HashMap<String, TransactionRecord>>>,
    /// Number of applied `update_status` calls, for idempotency assertions.
    updates: Arc<RwLock<u64>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a pending record for `out_trade_no`.
    pub async fn seed_pending(&self, out_trade_no: &str) {
        self.records
            .write()
            .await
            .insert(out_trade_no.to_string(), TransactionRecord::pending(out_trade_no));
    }

    pub async fn update_count(&self) -> u64 {
        *self.updates.read().await
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn find(&self, out_trade_no: &str) -> Result<Option<TransactionRecord>, DomainError> {
        Ok(self.records.read().await.get(out_trade_no).cloned())
    }

    async fn save(&self, record: TransactionRecord) -> Result<(), DomainError> {
        self.records
            .write()
            .await
            .insert(record.out_trade_no.clone(), record);
        Ok(())
    }

    async fn update_status(
        &self,
        out_trade_no: &str,
        expected: TransactionStatus,
        status: TransactionStatus,
        trade_no: Option<&str>,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(out_trade_no).ok_or_else(|| {
            DomainError::new(
                ErrorCode::TransactionNotFound,
                format!("Transaction not found: {}", out_trade_no),
            )
        })?;

        if record.status != expected {
            return Ok(false);
        }

        record.status = status;
        if let Some(trade_no) = trade_no {
            record.trade_no = Some(trade_no.to_string());
        }
        record.updated_at = Timestamp::now();

        *self.updates.write().await += 1;
        Ok(true)
    }
}
