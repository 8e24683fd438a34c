/// Deterministic tick identity: a hash of `(contract_id, delivery_area,
/// revision_or_timestamp, order_id, action_tag)`. Any 128-bit-equivalent
/// hash suffices as the idempotency key; this uses MD5 hex digest.
pub fn compute_tick_id(
    contract_id: &str,
    delivery_area: &str,
    revision_or_timestamp: &str,
    order_id: &str,
    action_tag: &str,
) -> String {
    let input = format!(
        "{contract_id}_{delivery_area}_{revision_or_timestamp}_{order_id}_{action_tag}"
    );
    format!("{:x}", md5::compute(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_input() {
        let a = compute_tick_id("C1", "SE3", "7", "O1", "UPDATE");
        let b = compute_tick_id("C1", "SE3", "7", "O1", "UPDATE");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn differs_when_any_component_changes() {
        let a = compute_tick_id("C1", "SE3", "7", "O1", "UPDATE");
        let b = compute_tick_id("C1", "SE3", "8", "O1", "UPDATE");
        assert_ne!(a, b);
    }
}
