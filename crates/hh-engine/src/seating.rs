use hh_core::Position;
use std::collections::BTreeSet;

/// Next member of `eligible` strictly clockwise from `from`, wrapping
/// through seat indices `0..table_size`. `from` itself is never returned
/// unless it is the only eligible seat.
pub fn next_clockwise(
    from: Position,
    table_size: usize,
    eligible: &BTreeSet<Position>,
) -> Option<Position> {
    if eligible.is_empty() {
        return None;
    }
    (1..=table_size)
        .map(|step| (from + step) % table_size)
        .find(|seat| eligible.contains(seat))
}

/// All eligible seats clockwise starting strictly after `from`, each seat
/// visited exactly once.
pub fn order_from(from: Position, table_size: usize, eligible: &BTreeSet<Position>) -> Vec<Position> {
    (1..=table_size)
        .map(|step| (from + step) % table_size)
        .filter(|seat| eligible.contains(seat))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around_table() {
        let eligible: BTreeSet<Position> = [0, 1, 3].into_iter().collect();
        assert_eq!(next_clockwise(3, 4, &eligible), Some(0));
        assert_eq!(next_clockwise(1, 4, &eligible), Some(3));
    }

    #[test]
    fn skips_ineligible_seats() {
        let eligible: BTreeSet<Position> = [0, 2].into_iter().collect();
        assert_eq!(next_clockwise(0, 4, &eligible), Some(2));
    }

    #[test]
    fn order_from_visits_each_eligible_seat_once() {
        let eligible: BTreeSet<Position> = [0, 1, 2, 3].into_iter().collect();
        assert_eq!(order_from(1, 4, &eligible), vec![2, 3, 0]);
    }
}
