use {alloy_primitives::U256, std::collections::HashMap};

/// Closed set of tracked token kinds. A deliberate departure from the
/// string-keyed (`"USDC"` / `"usdc"`) balances seen in sibling
/// implementations of this system, which were a source of spelling-drift
/// bugs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Usdc,
    Iou,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Usdc, TokenKind::Iou];

    pub const fn as_str(self) -> &'static str {
        match self {
            TokenKind::Usdc => "USDC",
            TokenKind::Iou => "IOU",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator balances on one network. Created on first observation of the
/// network and dropped when it leaves the active set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenBalance {
    pub native: U256,
    pub tokens: HashMap<TokenKind, U256>,
}

impl TokenBalance {
    pub fn token(&self, kind: TokenKind) -> U256 {
        self.tokens.get(&kind).copied().unwrap_or_default()
    }

    pub fn set_token(&mut self, kind: TokenKind, amount: U256) {
        self.tokens.insert(kind, amount);
    }

    pub fn has_native(&self, min: U256) -> bool {
        self.native >= min
    }

    pub fn has_token(&self, kind: TokenKind, min: U256) -> bool {
        self.token(kind) >= min
    }
}
