use alloy_primitives::U256;

/// Tracks the operator's net IOU exposure against `NET_TOTAL_ALLOWANCE`.
/// `total_redeemed_usdc` is the only mutable piece of "earned progress"
/// state in the system — monotone-nondecreasing, incremented only after a
/// `TakeSurplus` receipt is confirmed.
pub struct NetExposureTracker {
    net_total_allowance: U256,
    total_redeemed_usdc: U256,
}

impl NetExposureTracker {
    pub fn new(net_total_allowance: U256) -> Self {
        Self { net_total_allowance, total_redeemed_usdc: U256::ZERO }
    }

    pub fn total_redeemed_usdc(&self) -> U256 {
        self.total_redeemed_usdc
    }

    pub fn record_redemption(&mut self, amount: U256) {
        self.total_redeemed_usdc = self.total_redeemed_usdc.saturating_add(amount);
    }

    /// `NET_TOTAL_ALLOWANCE - (totalIOU - totalRedeemedUsdc)`, floored at
    /// zero (unsigned arithmetic already saturates rather than wrapping).
    pub fn net_allowance(&self, total_iou_across_chains: U256) -> U256 {
        let exposure = total_iou_across_chains.saturating_sub(self.total_redeemed_usdc);
        self.net_total_allowance.saturating_sub(exposure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_allowance_is_the_remaining_headroom() {
        let tracker = NetExposureTracker::new(U256::from(10_000_000u64));
        assert_eq!(tracker.net_allowance(U256::ZERO), U256::from(10_000_000u64));
    }

    #[test]
    fn net_allowance_floors_at_zero_when_exhausted() {
        let tracker = NetExposureTracker::new(U256::from(10_000_000u64));
        assert_eq!(tracker.net_allowance(U256::from(10_000_000u64)), U256::ZERO);
        assert_eq!(tracker.net_allowance(U256::from(50_000_000u64)), U256::ZERO);
    }

    #[test]
    fn redemptions_free_up_allowance() {
        let mut tracker = NetExposureTracker::new(U256::from(10_000_000u64));
        tracker.record_redemption(U256::from(4_000_000u64));
        assert_eq!(tracker.net_allowance(U256::from(10_000_000u64)), U256::from(4_000_000u64));
    }

    #[test]
    fn total_redeemed_is_monotone() {
        let mut tracker = NetExposureTracker::new(U256::from(10_000_000u64));
        tracker.record_redemption(U256::from(1u64));
        let after_first = tracker.total_redeemed_usdc();
        tracker.record_redemption(U256::from(1u64));
        assert!(tracker.total_redeemed_usdc() >= after_first);
    }
}
