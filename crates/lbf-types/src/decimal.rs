use alloy_primitives::U256;

/// USDC uses 6 decimals on every chain this system operates on.
pub const USDC_DECIMALS: u32 = 6;

/// Converts a base-unit amount to a floating-point value with `decimals`
/// digits of scale. This is the *only* place monetary state is allowed to
/// pass through a float — used exclusively by the opportunity scorer's
/// cost-factor computation, never for balance or threshold comparisons.
pub fn to_float(amount: U256, decimals: u32) -> f64 {
    let value: f64 = amount.to_string().parse().unwrap_or(f64::MAX);
    value / 10f64.powi(decimals as i32)
}
