//! Ordering gate for raw transaction submission.
//!
//! The send path reads the wallet's transaction count, registers the hash
//! mapping and forwards the inner transaction. That sequence must not
//! interleave with another submission, so it runs while holding a
//! [`GatePermit`]. The node uses [`GlobalGate`]; the other variants exist for
//! tests and for deployments that accept per-sender ordering only.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::types::Address;

/// Proof of holding the gate. Released on drop.
#[must_use = "the gate is released as soon as the permit is dropped"]
pub struct GatePermit {
    _guard: Option<Box<dyn Send>>,
}

impl GatePermit {
    fn guarded(guard: impl Send + 'static) -> Self {
        Self {
            _guard: Some(Box::new(guard)),
        }
    }

    fn unguarded() -> Self {
        Self { _guard: None }
    }
}

impl std::fmt::Debug for GatePermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatePermit")
            .field("guarded", &self._guard.is_some())
            .finish()
    }
}

/// Mutual exclusion around the register-then-forward sequence.
///
/// Waiting is unbounded: a submission that never completes blocks every later
/// submission sharing its lock.
#[async_trait]
pub trait OrderingGate: Send + Sync {
    async fn acquire(&self, sender: Address) -> GatePermit;
}

/// One lock for the whole node. All submissions are serialized.
#[derive(Debug, Default, Clone)]
pub struct GlobalGate {
    lock: Arc<Mutex<()>>,
}

impl GlobalGate {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderingGate for GlobalGate {
    async fn acquire(&self, _sender: Address) -> GatePermit {
        GatePermit::guarded(self.lock.clone().lock_owned().await)
    }
}

/// One lock per outer sender. Unrelated senders proceed concurrently.
#[derive(Debug, Default)]
pub struct PerSenderGate {
    locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl PerSenderGate {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderingGate for PerSenderGate {
    async fn acquire(&self, sender: Address) -> GatePermit {
        let lock = self.locks.entry(sender).or_default().value().clone();
        GatePermit::guarded(lock.lock_owned().await)
    }
}

/// No exclusion at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGate;

#[async_trait]
impl OrderingGate for NoopGate {
    async fn acquire(&self, _sender: Address) -> GatePermit {
        GatePermit::unguarded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_millis(50);

    async fn blocks(gate: &dyn OrderingGate, sender: Address) -> bool {
        timeout(WAIT, gate.acquire(sender)).await.is_err()
    }

    #[tokio::test]
    async fn test_global_gate_serializes_all_senders() {
        let gate = GlobalGate::new();
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);

        let permit = gate.acquire(a).await;
        assert!(blocks(&gate, a).await);
        assert!(blocks(&gate, b).await);

        drop(permit);
        assert!(!blocks(&gate, b).await);
    }

    #[tokio::test]
    async fn test_global_gate_clones_share_lock() {
        let gate = GlobalGate::new();
        let other = gate.clone();
        let _permit = gate.acquire(Address::zero()).await;
        assert!(blocks(&other, Address::zero()).await);
    }

    #[tokio::test]
    async fn test_per_sender_gate() {
        let gate = PerSenderGate::new();
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);

        let permit = gate.acquire(a).await;
        assert!(blocks(&gate, a).await);
        assert!(!blocks(&gate, b).await);

        drop(permit);
        assert!(!blocks(&gate, a).await);
    }

    #[tokio::test]
    async fn test_noop_gate_never_blocks() {
        let gate = NoopGate;
        let _first = gate.acquire(Address::zero()).await;
        assert!(!blocks(&gate, Address::zero()).await);
    }

    #[tokio::test]
    async fn test_waiters_run_one_at_a_time() {
        let gate = Arc::new(GlobalGate::new());
        let active = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut handles = Vec::new();

        for i in 0..8u8 {
            let gate = gate.clone();
            let active = active.clone();
            handles.push(tokio::spawn(async move {
                let _permit = gate.acquire(Address::repeat_byte(i)).await;
                let now = active.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                assert_eq!(now, 0);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
