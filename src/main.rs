use clap::Parser;
use escrowd::application::engine::SettlementEngine;
use escrowd::domain::money::Amount;
use escrowd::domain::owner::{Actor, OwnerRef};
use escrowd::domain::ports::ServiceCatalog;
use escrowd::error::{EngineError, Result};
use escrowd::infrastructure::catalog::InMemoryCatalog;
use escrowd::infrastructure::coordinator::TransactionCoordinator;
use escrowd::infrastructure::notify::LogNotifier;
use escrowd::interfaces::csv::command_reader::{Command, CommandReader, OpKind};
use escrowd::interfaces::csv::report_writer::{AccountWriter, OrderWriter};
use miette::{IntoDiagnostic, Result as CliResult};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_persistent(path: PathBuf) -> CliResult<TransactionCoordinator> {
    let backend = escrowd::infrastructure::rocksdb::RocksDbBackend::open(path).into_diagnostic()?;
    TransactionCoordinator::with_backend(Box::new(backend)).into_diagnostic()
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_persistent(_path: PathBuf) -> CliResult<TransactionCoordinator> {
    eprintln!(
        "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(TransactionCoordinator::in_memory())
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let coordinator = match cli.db_path {
        Some(path) => open_persistent(path)?,
        None => TransactionCoordinator::in_memory(),
    };

    let catalog = Arc::new(InMemoryCatalog::new());
    let engine = SettlementEngine::new(
        coordinator,
        catalog.clone(),
        Arc::new(LogNotifier),
    );

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command_result in reader.commands() {
        match command_result {
            Ok(command) => {
                if let Err(e) = run_command(&engine, &catalog, command).await {
                    eprintln!("Error processing command: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {e}");
            }
        }
    }

    let stdout = io::stdout();
    let mut lock = stdout.lock();
    AccountWriter::new(&mut lock)
        .write_accounts(engine.accounts().await)
        .into_diagnostic()?;
    OrderWriter::new(&mut lock)
        .write_orders(engine.orders().await)
        .into_diagnostic()?;

    Ok(())
}

async fn run_command(
    engine: &SettlementEngine,
    catalog: &InMemoryCatalog,
    command: Command,
) -> Result<()> {
    match command.op {
        OpKind::Deposit => {
            let owner = owner_of(&command)?;
            let amount = amount_of(&command)?;
            engine.deposit(owner, amount).await?;
        }
        OpKind::Withdraw => {
            let owner = owner_of(&command)?;
            let amount = amount_of(&command)?;
            engine.withdraw(owner, amount).await?;
        }
        OpKind::Offer => {
            let company = Command::require(command.actor, "actor")?;
            let price = amount_of(&command)?;
            let title = command.description.as_deref().unwrap_or("");
            catalog.register(company, title, price).await;
        }
        OpKind::Create => {
            let client = Command::require(command.actor, "actor")?;
            let service = Command::require(command.target, "target")?;
            let card = catalog
                .lookup(service)
                .await?
                .ok_or(EngineError::NotFound("service"))?;
            let description = command.description.as_deref().unwrap_or("");
            engine
                .create_order(client, card.company_id, service, description)
                .await?;
        }
        OpKind::Pay => {
            let client = Command::require(command.actor, "actor")?;
            let order = Command::require(command.target, "target")?;
            engine.pay_order(order, client).await?;
        }
        OpKind::Start => {
            let company = Command::require(command.actor, "actor")?;
            let order = Command::require(command.target, "target")?;
            engine.start_order(order, company).await?;
        }
        OpKind::Redeem => {
            // The command stream references the order; the stored
            // single-use token still gates the transition.
            let order_id = Command::require(command.target, "target")?;
            let order = engine.get_order(order_id).await?;
            let token = order.worker_token.ok_or_else(|| {
                EngineError::Validation("order has no worker token".to_string())
            })?;
            engine.redeem_worker_token(&token).await?;
        }
        OpKind::Finish => {
            let client = Command::require(command.actor, "actor")?;
            let order = Command::require(command.target, "target")?;
            engine.finish_order(order, client).await?;
        }
        OpKind::Cancel => {
            let kind = Command::require(command.actor_kind, "actor_kind")?;
            let id = Command::require(command.actor, "actor")?;
            let order = Command::require(command.target, "target")?;
            engine.cancel_order(order, Actor::new(kind, id)).await?;
        }
    }
    Ok(())
}

fn owner_of(command: &Command) -> Result<OwnerRef> {
    let kind = Command::require(command.actor_kind, "actor_kind")?;
    let id = Command::require(command.actor, "actor")?;
    Ok(OwnerRef { kind, id })
}

fn amount_of(command: &Command) -> Result<Amount> {
    let value = Command::require(command.amount, "amount")?;
    Amount::new(value)
}
