//! Domain layer: value objects, ledger tables and the ports to external
//! collaborators. Everything here is pure state and rules; locking and
//! persistence live in the infrastructure layer.

pub mod account;
pub mod escrow;
pub mod ledger;
pub mod money;
pub mod order;
pub mod owner;
pub mod ports;
pub mod state;
pub mod token;
