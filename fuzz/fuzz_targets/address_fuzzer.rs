//! Fuzz target for lipmaa addressing
//!
//! # Invariants
//!
//! - `skip_target(n)` lies in `[1, n)` for every `n >= 2`, including near
//!   `u64::MAX`
//! - `path_between(from, to)` is a backward walk of skip links and backlinks
//!   that ends at `to`
//! - NEVER panic or overflow

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lipmaa_core::{path_between, skip_target};

#[derive(Debug, Arbitrary)]
struct Input {
    from: u64,
    back: u32,
}

fuzz_target!(|input: Input| {
    let from = input.from;
    if from >= 2 {
        let target = skip_target(from);
        assert!(target >= 1 && target < from);
    }

    // Keep walks short enough to stay fast.
    let to = from.saturating_sub(u64::from(input.back % 4096));
    let Some(hops) = path_between(from, to) else {
        assert!(to == 0);
        return;
    };

    let mut current = from;
    for hop in hops.iter().rev() {
        assert!(*hop == current - 1 || *hop == skip_target(current));
        current = *hop;
    }
    assert_eq!(current, to);
});
