use std::sync::atomic::{AtomicU64, Ordering};

use autodb_types::CarId;

/// Supplies a fresh id for every create.
///
/// Implementations must never hand out the same id twice. The service
/// still checks the store and reports a conflict rather than overwriting.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> CarId;
}

/// Random UUID v4 ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> CarId {
        CarId::generate()
    }
}

/// Deterministic ids `{prefix}-000001`, `{prefix}-000002`, ...
///
/// Zero-padded so key order matches creation order, which keeps scan
/// results predictable in tests.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> CarId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        CarId::new(format!("{}-{n:06}", self.prefix))
    }
}
