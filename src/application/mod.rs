//! Application layer: the `SettlementEngine` exposing the order/escrow
//! operations, and the read-side order projection.

pub mod engine;
pub mod view;
