use crate::domain::owner::OwnerKind;
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// The operation column of a command row.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Deposit,
    Withdraw,
    Offer,
    Create,
    Pay,
    Start,
    Redeem,
    Finish,
    Cancel,
}

/// One row of the command stream:
/// `op, actor_kind, actor, target, amount, description`.
///
/// `target` is a service id for `create`/`offer` and an order id
/// everywhere else; unused columns stay empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: OpKind,
    pub actor_kind: Option<OwnerKind>,
    pub actor: Option<u32>,
    pub target: Option<u32>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

impl Command {
    /// Extracts a column that the operation requires.
    pub fn require<T: Copy>(field: Option<T>, name: &str) -> Result<T> {
        field.ok_or_else(|| EngineError::Validation(format!("missing required field: {name}")))
    }
}

/// Streams commands from a CSV source, trimming whitespace and tolerating
/// short rows. Malformed rows surface as errors without stopping the
/// iterator.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EngineError::from))
    }
}
