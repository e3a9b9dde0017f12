//! Whole-script admission against the round's memory allowance.

use log::{debug, info};

use crate::world::ResourceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted { size: u64, remaining: u64 },
    Rejected { size: u64, available: u64 },
}

/// Admit a script of `size` bytes.
///
/// On acceptance both `remaining_memory` and `executions_remaining` are
/// charged together; on rejection nothing changes.
pub fn admit(resources: &mut ResourceState, size: u64) -> Admission {
    if size > resources.remaining_memory {
        info!(
            "script rejected: {size} bytes requested, {} available",
            resources.remaining_memory
        );
        return Admission::Rejected {
            size,
            available: resources.remaining_memory,
        };
    }
    resources.remaining_memory -= size;
    resources.executions_remaining = resources.executions_remaining.saturating_sub(1);
    debug!(
        "script admitted: {size} bytes, {} left, {} executions left",
        resources.remaining_memory, resources.executions_remaining
    );
    Admission::Accepted {
        size,
        remaining: resources.remaining_memory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(remaining: u64) -> ResourceState {
        ResourceState {
            battery: 100,
            memory_budget: 1000,
            remaining_memory: remaining,
            executions_remaining: 3,
            level: 1,
        }
    }

    #[test]
    fn accepts_up_to_exact_fit() {
        let mut r = res(168);
        assert_eq!(admit(&mut r, 168), Admission::Accepted { size: 168, remaining: 0 });
        assert_eq!(r.remaining_memory, 0);
        assert_eq!(r.executions_remaining, 2);
    }

    #[test]
    fn rejection_changes_nothing() {
        let mut r = res(100);
        let before = r;
        assert_eq!(admit(&mut r, 101), Admission::Rejected { size: 101, available: 100 });
        assert_eq!(r, before);
    }
}
