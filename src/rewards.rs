//! Reward policy: decides whether an inbound message earns XP/GMP.
//!
//! The policy is a pure decision over (last reward timestamp, current
//! timestamp, message text); the store applies the resulting grant.

use crate::constants::{MESSAGE_REWARD, TACTICAL_WORDS, TACTICAL_WORD_REWARD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub xp: u64,
    pub gmp: i64,
    /// Recognized keywords credited toward the bonus (already capped).
    pub tactical_words: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RewardPolicy {
    cooldown_secs: u64,
    bonus_cap: u32,
}

impl RewardPolicy {
    pub const fn new(cooldown_secs: u64, bonus_cap: u32) -> Self {
        Self {
            cooldown_secs,
            bonus_cap,
        }
    }

    /// `None` while the member is still inside the cooldown window. A member
    /// with no previous reward has no window, so the first message always
    /// grants, including at `now == 0`.
    pub fn evaluate(&self, last_reward: Option<u64>, now: u64, text: &str) -> Option<Grant> {
        if let Some(last) = last_reward {
            if now.saturating_sub(last) < self.cooldown_secs {
                return None;
            }
        }
        let bonus = u32::try_from(count_tactical_words(text))
            .unwrap_or(u32::MAX)
            .min(self.bonus_cap);
        Some(Grant {
            xp: MESSAGE_REWARD.xp + u64::from(bonus) * TACTICAL_WORD_REWARD.xp,
            gmp: MESSAGE_REWARD.gmp + i64::from(bonus) * TACTICAL_WORD_REWARD.gmp,
            tactical_words: bonus,
        })
    }
}

/// Total occurrences of vocabulary entries in `text`, case-insensitive and
/// bounded by word boundaries. Duplicate occurrences each count.
pub fn count_tactical_words(text: &str) -> usize {
    let lowered = text.to_lowercase();
    TACTICAL_WORDS
        .iter()
        .map(|word| count_occurrences(&lowered, word))
        .sum()
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let mut count = 0;
    let mut offset = 0;
    while let Some(pos) = haystack[offset..].find(needle) {
        let start = offset + pos;
        let end = start + needle.len();
        let bounded_left = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let bounded_right = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if bounded_left && bounded_right {
            count += 1;
        }
        offset = end;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: RewardPolicy = RewardPolicy::new(30, 10);

    #[test]
    fn counts_are_case_insensitive() {
        assert_eq!(count_tactical_words("SNAKE? Snake?! snake!"), 3);
    }

    #[test]
    fn partial_words_do_not_match() {
        assert_eq!(count_tactical_words("snakes intelligence remission"), 0);
    }

    #[test]
    fn phrases_and_nested_words_each_count() {
        // "metal gear" matches as a phrase and "gear" matches on its own.
        assert_eq!(count_tactical_words("a metal gear walks into outer heaven"), 3);
    }

    #[test]
    fn first_message_rewards_even_at_epoch_zero() {
        let grant = POLICY.evaluate(None, 0, "tactical stealth operation").unwrap();
        assert_eq!(grant.tactical_words, 3);
        assert_eq!(grant.xp, MESSAGE_REWARD.xp + 3 * TACTICAL_WORD_REWARD.xp);
    }

    #[test]
    fn empty_text_grants_base_reward_only() {
        let grant = POLICY.evaluate(Some(0), 30, "").unwrap();
        assert_eq!(grant.xp, MESSAGE_REWARD.xp);
        assert_eq!(grant.gmp, MESSAGE_REWARD.gmp);
        assert_eq!(grant.tactical_words, 0);
    }

    #[test]
    fn bonus_caps_at_ten_keywords() {
        let text = "snake ".repeat(15);
        let grant = POLICY.evaluate(Some(0), 30, &text).unwrap();
        assert_eq!(grant.tactical_words, 10);
        assert_eq!(grant.xp, MESSAGE_REWARD.xp + 10 * TACTICAL_WORD_REWARD.xp);
        assert_eq!(
            grant.gmp,
            MESSAGE_REWARD.gmp + 10 * TACTICAL_WORD_REWARD.gmp
        );
    }

    #[test]
    fn cooldown_rejects_until_elapsed() {
        assert!(POLICY.evaluate(Some(100), 110, "hello").is_none());
        assert!(POLICY.evaluate(Some(100), 129, "hello").is_none());
        assert!(POLICY.evaluate(Some(100), 130, "hello").is_some());
        assert!(POLICY.evaluate(Some(100), 131, "hello").is_some());
    }

    #[test]
    fn clock_regression_does_not_underflow() {
        assert!(POLICY.evaluate(Some(100), 90, "hello").is_none());
    }
}
