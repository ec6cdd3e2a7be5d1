//! In-process sync lease manager
//!
//! One sync per member at a time. The lease is a guard object; dropping it
//! releases the slot, so an aborted sync can never wedge the member.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chorale_domain::{ChoraleError, Result};
use chorale_core::{SyncLease, SyncLeaseManager};
use tracing::debug;

#[derive(Default)]
pub struct InProcessSyncLease {
    held: Arc<Mutex<HashSet<String>>>,
}

impl InProcessSyncLease {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
struct LeaseGuard {
    member_id: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl SyncLease for LeaseGuard {}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.member_id);
        }
        debug!(member_id = %self.member_id, "sync lease released");
    }
}

impl SyncLeaseManager for InProcessSyncLease {
    fn acquire(&self, member_id: &str) -> Result<Box<dyn SyncLease>> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| ChoraleError::Internal("sync lease registry poisoned".to_string()))?;

        if !held.insert(member_id.to_string()) {
            return Err(ChoraleError::Conflict(
                "A calendar sync is already running for this member".to_string(),
            ));
        }

        debug!(member_id, "sync lease acquired");
        Ok(Box::new(LeaseGuard { member_id: member_id.to_string(), held: self.held.clone() }))
    }
}
