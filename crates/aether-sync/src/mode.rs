use std::sync::atomic::{AtomicU64, Ordering};

/// Shared (reader) or exclusive (writer) lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Shared,
    Exclusive,
}

impl LockMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Exclusive => "exclusive",
        }
    }
}

/// Identifies the "logical owner" re-entrancy is scoped to: one [`crate::synccontext::SyncContext`]
/// instance. Two acquisitions from the same sync context (even across
/// threads, if the context is shared) are treated as one logical holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

impl OwnerId {
    pub fn fresh() -> Self {
        Self(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_owner_ids_are_distinct() {
        assert_ne!(OwnerId::fresh(), OwnerId::fresh());
    }
}
