//! Pure rank resolution over the ordered threshold table.

use crate::constants::{RankDef, RANKS};

/// Where an XP value sits in the rank table.
#[derive(Debug, PartialEq, Eq)]
pub struct RankProgress {
    pub current: &'static RankDef,
    /// XP floor of the current tier.
    pub floor: u64,
    /// XP floor of the next tier, absent at the final tier.
    pub ceiling: Option<u64>,
    pub next: Option<&'static RankDef>,
}

/// Highest tier whose floor does not exceed `xp`. Total over all `u64`
/// because the first floor is 0.
pub fn rank_for_xp(xp: u64) -> &'static RankDef {
    RANKS
        .iter()
        .rev()
        .find(|rank| xp >= rank.required_xp)
        .unwrap_or(&RANKS[0])
}

pub fn resolve(xp: u64) -> RankProgress {
    let index = RANKS
        .iter()
        .rposition(|rank| xp >= rank.required_xp)
        .unwrap_or(0);
    let next = RANKS.get(index + 1);
    RankProgress {
        current: &RANKS[index],
        floor: RANKS[index].required_xp,
        ceiling: next.map(|rank| rank.required_xp),
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_strictly_increase() {
        for pair in RANKS.windows(2) {
            assert!(pair[0].required_xp < pair[1].required_xp);
        }
        assert_eq!(RANKS[0].required_xp, 0);
    }

    #[test]
    fn highest_qualifying_floor_wins() {
        for xp in [0u64, 1, 99, 100, 101, 350, 4000, 99999] {
            let progress = resolve(xp);
            assert!(progress.floor <= xp);
            // No later tier may also qualify.
            if let Some(next) = progress.next {
                assert!(xp < next.required_xp);
            }
        }
    }

    #[test]
    fn resolves_exact_boundaries() {
        assert_eq!(rank_for_xp(0).name, "Rookie");
        assert_eq!(rank_for_xp(99).name, "Rookie");
        assert_eq!(rank_for_xp(100).name, "Private");
        assert_eq!(rank_for_xp(2500).name, "Colonel");
    }

    #[test]
    fn final_tier_has_no_ceiling() {
        let progress = resolve(1_000_000);
        assert_eq!(progress.current.name, "FOXHOUND");
        assert_eq!(progress.ceiling, None);
        assert!(progress.next.is_none());
    }
}
