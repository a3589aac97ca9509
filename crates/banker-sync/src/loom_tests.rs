//! Loom tests for the shared allocator
//!
//! Loom explores all possible interleavings of concurrent operations. With
//! the `loom` feature enabled, `SharedAllocator` is built on loom's `Arc` and
//! `Mutex`, so these tests check the real lock discipline: the provisional
//! commit, the safety check and any rollback are never observed half-done.
//!
//! # Running Loom Tests
//!
//! ```bash
//! cargo test --package banker-sync --features loom -- --test-threads=1 loom
//! ```
//!
//! Note: Loom tests must run single-threaded and can take a while to explore
//! all interleavings.

#[cfg(all(test, feature = "loom"))]
mod tests {
    use crate::shared::{SharedSafeAllocator, SharedShadowAllocator};
    use banker_core::{assert_invariants, Command, Outcome, ProcessId, ResourceId, SystemConfig};
    use loom::thread;

    fn textbook() -> SystemConfig {
        SystemConfig::new(3, 2, vec![2, 3], vec![vec![2, 1], vec![2, 2], vec![2, 2]])
    }

    /// Test: Racing requests for the last unit
    ///
    /// Exactly one of two requests for a single free unit is granted.
    #[test]
    fn loom_last_unit_granted_once() {
        loom::model(|| {
            let config = SystemConfig::new(2, 1, vec![1], vec![vec![1], vec![1]]);
            let shared = SharedSafeAllocator::new(config).unwrap();

            let s1 = shared.clone();
            let s2 = shared.clone();
            let t1 = thread::spawn(move || s1.step(Command::request(0, 0, 1)).unwrap().outcome);
            let t2 = thread::spawn(move || s2.step(Command::request(1, 0, 1)).unwrap().outcome);

            let outcomes = [t1.join().unwrap(), t2.join().unwrap()];
            let granted = outcomes.iter().filter(|o| **o == Outcome::Granted).count();
            assert_eq!(granted, 1, "{:?}", outcomes);
            assert!(outcomes.contains(&Outcome::InsufficientAvailable));

            let snapshot = shared.snapshot().unwrap();
            assert_invariants(snapshot.state());
            assert_eq!(snapshot.state().available(), &[0]);
        });
    }

    /// Test: Request racing a release
    ///
    /// `request(1,0,1)` is unsafe until P2 releases its units. Whichever order
    /// the lock admits, the state stays safe and the outcome agrees with the
    /// recorded allocation.
    #[test]
    fn loom_request_races_release() {
        loom::model(|| {
            let shared = SharedSafeAllocator::new(textbook()).unwrap();
            shared.step(Command::request(0, 1, 1)).unwrap();
            shared.step(Command::request(2, 1, 2)).unwrap();

            let s1 = shared.clone();
            let s2 = shared.clone();
            let t1 = thread::spawn(move || s1.step(Command::request(1, 0, 1)).unwrap().outcome);
            let t2 = thread::spawn(move || s2.step(Command::release(2, 1, 2)).unwrap().outcome);

            let request = t1.join().unwrap();
            assert_eq!(t2.join().unwrap(), Outcome::Released);
            assert!(request == Outcome::Granted || request == Outcome::DeniedUnsafe);

            let snapshot = shared.snapshot().unwrap();
            assert_invariants(snapshot.state());
            assert!(snapshot.is_safe());
            let held = snapshot.state().held(ProcessId(1), ResourceId(0));
            assert_eq!(held, Some(u64::from(request == Outcome::Granted)));
        });
    }

    /// Test: Shadow grants everything and ends deadlocked
    ///
    /// Three requests race on the shadow allocator. Every order grants all
    /// three, the final grant always reports the deadlock, and an earlier
    /// grant reports it only when P1 and P2 lock each other out first.
    #[test]
    fn loom_shadow_ends_deadlocked() {
        loom::model(|| {
            let shared = SharedShadowAllocator::new(textbook()).unwrap();

            let handles: Vec<_> = [(0, 1, 1), (2, 1, 2), (1, 0, 1)]
                .into_iter()
                .map(|(p, r, u)| {
                    let s = shared.clone();
                    thread::spawn(move || s.step(Command::request(p, r, u)).unwrap().outcome)
                })
                .collect();
            let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

            assert!(outcomes.iter().all(|o| o.is_committed()));
            let reports = outcomes
                .iter()
                .filter(|o| **o == Outcome::GrantedDeadlocked)
                .count();
            assert!((1..=2).contains(&reports), "{:?}", outcomes);
            if reports == 2 {
                assert_eq!(outcomes[0], Outcome::GrantedDeadlocked);
            }
            assert!(shared.is_deadlocked().unwrap());
        });
    }
}

// ============================================================================
// Documentation-only module for non-loom builds
// ============================================================================

#[cfg(not(feature = "loom"))]
/// Loom tests are only available with the `loom` feature.
///
/// To run loom tests:
/// ```bash
/// cargo test --package banker-sync --features loom -- --test-threads=1 loom
/// ```
pub mod _loom_docs {}
