//! Seeded template assignment.
//!
//! `assign` is the only place a template id is drawn. It hands back the whole
//! [`ArtifactIdentity`], which the caller keeps for every file it writes for that
//! record. Asking twice for the same record is rejected.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::identity::{ArtifactIdentity, IdentityError, TemplateId, TemplatePool};

pub struct TemplateSelector {
    rng: StdRng,
    pool: TemplatePool,
    assigned: HashSet<u32>,
}

impl TemplateSelector {
    pub fn new(seed: u64, pool: TemplatePool) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), pool)
    }

    pub fn from_rng(rng: StdRng, pool: TemplatePool) -> Self {
        TemplateSelector {
            rng,
            pool,
            assigned: HashSet::new(),
        }
    }

    /// Draws a template uniformly from the pool and binds it to `sequence_index`.
    pub fn assign(&mut self, sequence_index: u32) -> Result<ArtifactIdentity, IdentityError> {
        if sequence_index == 0 {
            return Err(IdentityError::ZeroSequenceIndex);
        }
        if !self.assigned.insert(sequence_index) {
            return Err(IdentityError::AlreadyAssigned(sequence_index));
        }
        let drawn = self.rng.gen_range(1..=self.pool.size() as u32);
        ArtifactIdentity::new(sequence_index, TemplateId::new(drawn)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn pool() -> TemplatePool {
        TemplatePool::new(10).unwrap()
    }

    #[test]
    fn test_same_seed_same_assignments() {
        let mut a = TemplateSelector::new(100, pool());
        let mut b = TemplateSelector::new(100, pool());
        for seq in 1..=50 {
            assert_eq!(a.assign(seq).unwrap(), b.assign(seq).unwrap());
        }
    }

    #[test]
    fn test_assignments_stay_in_pool() {
        let small = TemplatePool::new(3).unwrap();
        let mut selector = TemplateSelector::new(1, small);
        for seq in 1..=200 {
            let identity = selector.assign(seq).unwrap();
            assert!(small.contains(identity.template_id()));
            assert_eq!(identity.sequence_index(), seq);
        }
    }

    #[test]
    fn test_every_template_is_reachable() {
        let mut selector = TemplateSelector::new(100, pool());
        let mut counts: HashMap<TemplateId, u32> = HashMap::new();
        for seq in 1..=2000 {
            *counts.entry(selector.assign(seq).unwrap().template_id()).or_default() += 1;
        }
        assert_eq!(counts.len(), 10);
        // Uniform over 10 → ~200 each; allow a generous band.
        assert!(counts.values().all(|&c| (120..=280).contains(&c)), "{counts:?}");
    }

    #[test]
    fn test_second_assignment_for_same_record_rejected() {
        let mut selector = TemplateSelector::new(100, pool());
        selector.assign(42).unwrap();
        assert_eq!(selector.assign(42), Err(IdentityError::AlreadyAssigned(42)));
    }

    #[test]
    fn test_zero_sequence_index_rejected() {
        let mut selector = TemplateSelector::new(100, pool());
        assert_eq!(selector.assign(0), Err(IdentityError::ZeroSequenceIndex));
    }
}
