/// Cooldown reference for the mystery box: the later of the last claim and
/// the first launch.
pub fn mystery_box_reference(last_claim_ms: Option<i64>, first_launch_ms: Option<i64>) -> Option<i64> {
    match (last_claim_ms, first_launch_ms) {
        (Some(claim), Some(launch)) => Some(claim.max(launch)),
        (claim, launch) => claim.or(launch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_timestamp_wins() {
        assert_eq!(mystery_box_reference(Some(5), Some(9)), Some(9));
        assert_eq!(mystery_box_reference(Some(12), Some(9)), Some(12));
        assert_eq!(mystery_box_reference(None, Some(9)), Some(9));
        assert_eq!(mystery_box_reference(None, None), None);
    }
}
