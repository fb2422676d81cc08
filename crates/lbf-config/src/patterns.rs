//! Manifest key patterns, recognized as documented in spec §6. The first
//! capture group of a match yields the network name.

use {once_cell::sync::Lazy, regex::Regex};

pub static CHILD_POOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LBF_CHILD_POOL_(.+)").expect("valid regex"));
pub static PARENT_POOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LBF_PARENT_POOL_(.+)").expect("valid regex"));
pub static USDC: Lazy<Regex> = Lazy::new(|| Regex::new(r"USDC_(.+)").expect("valid regex"));
pub static IOU: Lazy<Regex> = Lazy::new(|| Regex::new(r"IOU_(.+)").expect("valid regex"));
