//! Lipmaa skip-list addressing.
//!
//! Every entry with sequence `n >= 2` carries a skip link to the entry at
//! [`skip_target(n)`](skip_target). The targets are chosen along blocks of
//! size `(3^k - 1) / 2`, which gives a path of O(log n) hops from any entry to
//! the first entry and between any two entries of a log.
//!
//! # Conventions
//!
//! - Sequence numbers start at 1; sequence 1 is the only root.
//! - `skip_target(n)` lies in `[1, n)` for every `n >= 2`.
//! - `skip_target(0) == skip_target(1) == 0`; neither value is ever linked.
//!
//! The output is part of the log format. Any deviation, including at small
//! `n`, produces entries other implementations reject.

/// Sequence number the entry at `n` skip-links to.
pub fn skip_target(n: u64) -> u64 {
    // 3^41 overflows u64 before the block search terminates for n near u64::MAX.
    let n_wide = u128::from(n);

    // Smallest block (3^k - 1) / 2 that covers n.
    let mut m: u128 = 1;
    let mut po3: u128 = 3;
    while m < n_wide {
        po3 *= 3;
        m = (po3 - 1) / 2;
    }
    po3 /= 3;

    // Longest backjump that stays inside the block structure.
    if m != n_wide {
        let mut x = n_wide;
        while x != 0 {
            m = (po3 - 1) / 2;
            po3 /= 3;
            if m == 0 {
                break;
            }
            x %= m;
        }
        if m != po3 {
            po3 = m;
        }
    }

    // Never exceeds n, so it always fits back into u64.
    u64::try_from(n_wide.saturating_sub(po3)).unwrap_or(0)
}

/// Skip hops from `n` back to the root, root first, excluding `n`.
///
/// Empty for `n <= 1`. Otherwise starts at 1 and ends at `skip_target(n)`.
pub fn path_to_root(n: u64) -> Vec<u64> {
    let mut path = Vec::new();
    let mut current = n;
    while current > 1 {
        current = skip_target(current);
        path.push(current);
    }
    path.reverse();
    path
}

/// Backward path from `from` to `to`, oldest first, excluding `from`.
///
/// Follows a skip link whenever it does not jump past `to` and the backlink
/// otherwise. Returns `None` when `to` is 0 or newer than `from`.
pub fn path_between(from: u64, to: u64) -> Option<Vec<u64>> {
    if to == 0 || to > from {
        return None;
    }

    let mut hops = Vec::new();
    let mut current = from;
    while current > to {
        let skip = skip_target(current);
        current = if skip >= to { skip } else { current - 1 };
        hops.push(current);
    }
    hops.reverse();
    Some(hops)
}

/// Sequences a relying party needs to verify entry `n` from scratch.
///
/// The skip path to the root followed by `n` itself.
pub fn certificate_pool(n: u64) -> Vec<u64> {
    if n == 0 {
        return Vec::new();
    }
    let mut pool = path_to_root(n);
    pool.push(n);
    pool
}
