use {alloy_primitives::U256, lbf_types::TokenKind};

/// A single watcher reading, posted into the core inbox. Applying one of
/// these only ever touches the affected field of the target network's
/// `TokenBalance`, preserving the rest (copy-on-write per entry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BalanceEvent {
    NativeUpdated { network: String, amount: U256 },
    TokenUpdated { network: String, token: TokenKind, amount: U256 },
}
