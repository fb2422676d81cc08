//! The closed set of events the core's single inbox-processing task reacts
//! to. Everything that mutates in-memory state funnels through one of
//! these, consumed serially.

use {lbf_balances::BalanceEvent, lbf_pool_observer::PoolEvent};

pub enum CoreEvent {
    PoolUpdated(PoolEvent),
    BalanceUpdated(BalanceEvent),
    Tick,
}
