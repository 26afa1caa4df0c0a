//! Number and progress-bar formatting for embeds.

/// Renders `n` with comma-grouped digits.
pub fn format_number(n: impl Into<i128>) -> String {
    let n = n.into();
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && i % 3 == lead % 3 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Fixed-width progress bar with an integer percentage, e.g. `[■■■□□□□□□□] 30%`.
///
/// `current` is clamped to `max`; a zero `max` renders as completely filled
/// rather than dividing by zero.
#[allow(clippy::cast_possible_truncation)]
pub fn progress_bar(current: u64, max: u64, length: usize) -> String {
    let (filled, percentage) = if max == 0 {
        (length, 100)
    } else {
        let current = u128::from(current.min(max));
        let max = u128::from(max);
        (
            // Both quotients are bounded by `length` and 100 respectively.
            (current * length as u128 / max) as usize,
            (current * 100 / max) as u64,
        )
    };
    let mut bar = String::with_capacity(length * 3 + 8);
    bar.push('[');
    for _ in 0..filled {
        bar.push('■');
    }
    for _ in filled..length {
        bar.push('□');
    }
    bar.push(']');
    bar.push_str(&format!(" {percentage}%"));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits() {
        assert_eq!(format_number(0u64), "0");
        assert_eq!(format_number(999u64), "999");
        assert_eq!(format_number(1000u64), "1,000");
        assert_eq!(format_number(1_234_567u64), "1,234,567");
        assert_eq!(format_number(-1500i64), "-1,500");
    }

    #[test]
    fn bar_segments_sum_to_length() {
        for max in [1u64, 7, 10, 100, 12345] {
            for current in [0, max / 3, max / 2, max] {
                let bar = progress_bar(current, max, 10);
                let filled = bar.matches('■').count();
                let empty = bar.matches('□').count();
                assert_eq!(filled + empty, 10, "{bar}");
            }
        }
    }

    #[test]
    fn bar_percentage_is_floored() {
        assert_eq!(progress_bar(1, 3, 10), "[■■■□□□□□□□] 33%");
        assert_eq!(progress_bar(0, 10, 10), "[□□□□□□□□□□] 0%");
        assert_eq!(progress_bar(10, 10, 10), "[■■■■■■■■■■] 100%");
    }

    #[test]
    fn bar_clamps_overflow() {
        assert_eq!(progress_bar(25, 10, 10), "[■■■■■■■■■■] 100%");
    }

    #[test]
    fn zero_max_renders_full() {
        assert_eq!(progress_bar(0, 0, 10), "[■■■■■■■■■■] 100%");
    }
}
