//! Reviewer candidate selection.
//!
//! Pure functions: no I/O and no shared state. Randomness comes from the
//! calling thread's generator, so concurrent requests never share a seed.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::domains::users::User;

/// Number of reviewers assigned when a pull request is created.
pub const MAX_REVIEWERS: usize = 2;

/// Active members whose id is not in `exclude`, in member order.
pub fn select_candidates(members: &[User], exclude: &HashSet<&str>) -> Vec<String> {
    members
        .iter()
        .filter(|member| member.is_active)
        .filter(|member| !exclude.contains(member.user_id.as_str()))
        .map(|member| member.user_id.clone())
        .collect()
}

/// Up to `count` distinct candidates drawn uniformly without replacement.
///
/// Always returns a new vector; an empty candidate list yields an empty result.
pub fn choose_random(candidates: &[String], count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    candidates
        .choose_multiple(&mut rng, count)
        .cloned()
        .collect()
}
