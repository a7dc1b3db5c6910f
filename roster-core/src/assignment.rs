//! Reviewer assignment engine
//!
//! Pure selection logic: given the active members of a team and the pull
//! request being reviewed, decide who reviews it. Nothing here touches a store
//! or suspends; randomness is supplied by the caller so that a seeded
//! generator reproduces the same decisions.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::{PullRequest, User};
use crate::{Error, Result};

/// Upper bound on reviewers assigned when a pull request is created
pub const MAX_REVIEWERS: usize = 2;

/// Pick the initial reviewers for a pull request by `author_id`
///
/// The candidate pool is every active member except the author. The pool is
/// shuffled uniformly and the first `min(MAX_REVIEWERS, pool)` entries are
/// returned in shuffled order, which becomes the assignment order.
///
/// Fails with `NoCandidate` when nobody but the author is active; `pr_id` only
/// labels that error.
pub fn select_reviewers<R: Rng + ?Sized>(
    pr_id: &str,
    author_id: &str,
    active_members: &[User],
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut pool = candidate_pool(active_members, |id| id == author_id);

    if pool.is_empty() {
        return Err(Error::NoCandidate(pr_id.to_string()));
    }

    pool.shuffle(rng);
    pool.truncate(MAX_REVIEWERS);
    Ok(pool)
}

/// Pick a replacement for `old_reviewer_id` on `pr`
///
/// Checks, in order, that the pull request is open (`PrMerged`) and that the
/// old reviewer is assigned (`NotAssigned`). The pool is the supplied active
/// members minus the author and every current reviewer, the outgoing one
/// included; an empty pool is `NoCandidate`.
pub fn select_replacement<R: Rng + ?Sized>(
    pr: &PullRequest,
    old_reviewer_id: &str,
    active_members: &[User],
    rng: &mut R,
) -> Result<String> {
    ensure_reassignable(pr, old_reviewer_id)?;

    let pool = candidate_pool(active_members, |id| {
        id == pr.author_id || pr.has_reviewer(id)
    });

    pool.choose(rng)
        .cloned()
        .ok_or_else(|| Error::NoCandidate(pr.id.clone()))
}

/// Precondition shared by the engine and the stores for reviewer swaps
pub fn ensure_reassignable(pr: &PullRequest, old_reviewer_id: &str) -> Result<()> {
    if pr.is_merged() {
        return Err(Error::PrMerged(pr.id.clone()));
    }
    if !pr.has_reviewer(old_reviewer_id) {
        return Err(Error::NotAssigned {
            pr_id: pr.id.clone(),
            user_id: old_reviewer_id.to_string(),
        });
    }
    Ok(())
}

/// Active, de-duplicated member ids that `excluded` does not reject
///
/// Keeps the store's order so that a seeded generator sees a stable input.
fn candidate_pool(active_members: &[User], excluded: impl Fn(&str) -> bool) -> Vec<String> {
    let mut seen = HashSet::new();
    active_members
        .iter()
        .filter(|u| u.is_active && !excluded(&u.id))
        .filter(|u| seen.insert(u.id.as_str()))
        .map(|u| u.id.clone())
        .collect()
}

/// Source of per-call random generators
///
/// Each assignment decision gets its own `StdRng`; nothing process-wide is
/// shared. A seeded source derives call `n`'s seed as `seed + n`, so a fresh
/// service with the same seed replays the same decisions.
#[derive(Debug, Default)]
pub enum RngSource {
    /// Seed every generator from OS entropy
    #[default]
    Entropy,
    /// Deterministic generators for tests and reproducible runs
    Seeded { seed: u64, calls: AtomicU64 },
}

impl RngSource {
    pub fn seeded(seed: u64) -> Self {
        RngSource::Seeded {
            seed,
            calls: AtomicU64::new(0),
        }
    }

    /// Build the source from an optional configured seed
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(RngSource::Entropy, Self::seeded)
    }

    /// A fresh generator for one decision
    pub fn next_rng(&self) -> StdRng {
        match self {
            RngSource::Entropy => StdRng::from_entropy(),
            RngSource::Seeded { seed, calls } => {
                let n = calls.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed.wrapping_add(n))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrStatus;

    fn team(ids: &[&str]) -> Vec<User> {
        ids.iter()
            .map(|id| User::new(*id, id.to_uppercase(), "backend"))
            .collect()
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_two_reviewers_when_pool_is_large() {
        let members = team(&["x", "a", "b", "c", "d"]);
        for seed in 0..200 {
            let reviewers = select_reviewers("pr", "x", &members, &mut rng(seed)).unwrap();
            assert_eq!(reviewers.len(), 2);
            assert!(!reviewers.contains(&"x".to_string()));
            assert_ne!(reviewers[0], reviewers[1]);
        }
    }

    #[test]
    fn test_single_reviewer_when_one_teammate() {
        let members = team(&["x", "a"]);
        let reviewers = select_reviewers("pr", "x", &members, &mut rng(1)).unwrap();
        assert_eq!(reviewers, vec!["a"]);
    }

    #[test]
    fn test_no_candidate_when_author_alone() {
        let members = team(&["x"]);
        let err = select_reviewers("pr-9", "x", &members, &mut rng(1)).unwrap_err();
        assert!(matches!(err, Error::NoCandidate(ref id) if id == "pr-9"));

        let err = select_reviewers("pr-9", "x", &[], &mut rng(1)).unwrap_err();
        assert!(matches!(err, Error::NoCandidate(_)));
    }

    #[test]
    fn test_inactive_and_duplicate_members_ignored() {
        let mut members = team(&["x", "a"]);
        members.push(User::new("b", "B", "backend").with_active(false));
        members.push(User::new("a", "A again", "backend"));

        for seed in 0..50 {
            let reviewers = select_reviewers("pr", "x", &members, &mut rng(seed)).unwrap();
            assert_eq!(reviewers, vec!["a"]);
        }
    }

    #[test]
    fn test_selection_covers_every_candidate() {
        let members = team(&["x", "a", "b", "c", "d"]);
        let mut picked = HashSet::new();
        for seed in 0..200 {
            for id in select_reviewers("pr", "x", &members, &mut rng(seed)).unwrap() {
                picked.insert(id);
            }
        }
        let expected: HashSet<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let members = team(&["x", "a", "b", "c", "d", "e", "f"]);
        let first = select_reviewers("pr", "x", &members, &mut rng(42)).unwrap();
        let second = select_reviewers("pr", "x", &members, &mut rng(42)).unwrap();
        assert_eq!(first, second);
    }

    fn pr_ab() -> PullRequest {
        PullRequest::new("pr-1", "Feature", "x")
            .with_reviewers(vec!["a".to_string(), "b".to_string()])
    }

    #[test]
    fn test_replacement_excludes_author_and_reviewers() {
        let members = team(&["a", "b", "x", "c", "d"]);
        let pr = pr_ab();
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let new = select_replacement(&pr, "a", &members, &mut rng(seed)).unwrap();
            assert!(new == "c" || new == "d", "unexpected reviewer {new}");
            seen.insert(new);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_replacement_on_merged_pr() {
        let members = team(&["a", "b", "x", "c"]);
        let mut pr = pr_ab();
        pr.status = PrStatus::Merged;
        let err = select_replacement(&pr, "a", &members, &mut rng(1)).unwrap_err();
        assert!(matches!(err, Error::PrMerged(_)));
    }

    #[test]
    fn test_replacement_for_unassigned_user() {
        let members = team(&["a", "b", "x", "c"]);
        let err = select_replacement(&pr_ab(), "c", &members, &mut rng(1)).unwrap_err();
        assert!(matches!(err, Error::NotAssigned { ref user_id, .. } if user_id == "c"));
    }

    #[test]
    fn test_merged_checked_before_assignment() {
        let mut pr = pr_ab();
        pr.status = PrStatus::Merged;
        let err = select_replacement(&pr, "nobody", &[], &mut rng(1)).unwrap_err();
        assert!(matches!(err, Error::PrMerged(_)));
    }

    #[test]
    fn test_replacement_no_candidate() {
        let members = team(&["a", "b", "x"]);
        let err = select_replacement(&pr_ab(), "a", &members, &mut rng(1)).unwrap_err();
        assert!(matches!(err, Error::NoCandidate(_)));
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let members = team(&["x", "a", "b", "c", "d", "e"]);
        let run = |source: &RngSource| -> Vec<Vec<String>> {
            (0..5)
                .map(|_| select_reviewers("pr", "x", &members, &mut source.next_rng()).unwrap())
                .collect()
        };
        assert_eq!(run(&RngSource::seeded(9)), run(&RngSource::seeded(9)));
    }

    #[test]
    fn test_from_seed() {
        assert!(matches!(RngSource::from_seed(None), RngSource::Entropy));
        assert!(matches!(
            RngSource::from_seed(Some(3)),
            RngSource::Seeded { seed: 3, .. }
        ));
    }
}
