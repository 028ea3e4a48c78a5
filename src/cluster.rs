//! Seed-driven duplicate grouping.
//!
//! Single greedy pass over the batch: every unclaimed name seeds a new
//! group and claims each later unclaimed name that the rule chain pairs
//! with the *seed*. Members are never compared with each other, so a group
//! is not a transitive closure and the result depends on batch order.

use crate::options::DedupOptions;
use crate::rules::{evaluate, DishProfile, RuleId};
use rayon::prelude::*;
use tracing::{debug, info};

/// Indices into the profiled batch, seed first, in claim order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    pub members: Vec<usize>,
}

impl IndexGroup {
    pub fn seed(&self) -> usize {
        self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Builds the profiles for a batch, in parallel if enabled.
pub fn profile_batch(names: &[String], options: &DedupOptions) -> Vec<DishProfile> {
    if options.parallel {
        names.par_iter().map(|name| DishProfile::new(name)).collect()
    } else {
        names.iter().map(|name| DishProfile::new(name)).collect()
    }
}

/// Groups profiles by the seed-driven pass. Singletons are dropped.
///
/// With `options.parallel` the comparisons against one seed run on the rayon
/// pool; claims are still applied in batch order, so the result is the same
/// as the sequential pass.
pub fn build_groups(profiles: &[DishProfile], options: &DedupOptions) -> Vec<IndexGroup> {
    let mut claimed = vec![false; profiles.len()];
    let mut groups = Vec::new();
    let mut comparisons = 0usize;

    for seed in 0..profiles.len() {
        if claimed[seed] {
            continue;
        }
        claimed[seed] = true;

        let candidates: Vec<usize> = ((seed + 1)..profiles.len())
            .filter(|&idx| !claimed[idx])
            .collect();
        comparisons += candidates.len();

        let matches = match_seed(&profiles[seed], profiles, &candidates, options);

        let mut members = vec![seed];
        for (idx, rule) in matches {
            debug!(
                seed = %profiles[seed].raw,
                duplicate = %profiles[idx].raw,
                rule = ?rule,
                "claimed duplicate"
            );
            claimed[idx] = true;
            members.push(idx);
        }

        if members.len() > 1 {
            groups.push(IndexGroup { members });
        }
    }

    info!(
        names = profiles.len(),
        groups = groups.len(),
        comparisons,
        "duplicate grouping finished"
    );

    groups
}

/// Candidates that pair with `seed`, in candidate order, with the deciding rule.
fn match_seed(
    seed: &DishProfile,
    profiles: &[DishProfile],
    candidates: &[usize],
    options: &DedupOptions,
) -> Vec<(usize, Option<RuleId>)> {
    let check = |&idx: &usize| {
        let decision = evaluate(seed, &profiles[idx], options);
        decision.duplicate.then_some((idx, decision.rule))
    };

    if options.parallel {
        // par_iter + collect preserves candidate order
        candidates.par_iter().filter_map(check).collect()
    } else {
        candidates.iter().filter_map(check).collect()
    }
}
