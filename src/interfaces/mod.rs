//! Interface adapters. Only a CSV command stream and CSV reports exist in
//! this crate; HTTP transport lives outside the engine.

pub mod csv;
