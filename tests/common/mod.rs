use escrowd::application::engine::SettlementEngine;
use escrowd::domain::money::Amount;
use escrowd::infrastructure::catalog::InMemoryCatalog;
use escrowd::infrastructure::coordinator::TransactionCoordinator;
use escrowd::infrastructure::notify::RecordingNotifier;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub struct TestContext {
    pub engine: SettlementEngine,
    pub notifier: RecordingNotifier,
    pub catalog: Arc<InMemoryCatalog>,
}

/// Engine with an in-memory coordinator and one service card:
/// company 1 offering "Office cleaning" at the given price (card id 1).
pub async fn engine_with_card(price: Decimal) -> TestContext {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .register(1, "Office cleaning", Amount::new(price).unwrap())
        .await;
    let notifier = RecordingNotifier::new();
    let engine = SettlementEngine::new(
        TransactionCoordinator::in_memory(),
        catalog.clone(),
        Arc::new(notifier.clone()),
    );
    TestContext {
        engine,
        notifier,
        catalog,
    }
}

/// Writes a command CSV that settles `orders` full order lifecycles for
/// client 1 against company 1 (service price 500).
pub fn generate_scenario_csv(path: &Path, orders: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["op", "actor_kind", "actor", "target", "amount", "description"])?;
    wtr.write_record([
        "deposit",
        "client",
        "1",
        "",
        &format!("{}.0", orders * 500),
        "",
    ])?;
    wtr.write_record(["offer", "company", "1", "", "500.0", "Office cleaning"])?;

    for i in 1..=orders {
        let order = i.to_string();
        wtr.write_record(["create", "client", "1", "1", "", ""])?;
        wtr.write_record(["pay", "client", "1", &order, "", ""])?;
        wtr.write_record(["start", "company", "1", &order, "", ""])?;
        wtr.write_record(["redeem", "", "", &order, "", ""])?;
        wtr.write_record(["finish", "client", "1", &order, "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
