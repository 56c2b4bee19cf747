use crate::config::Config;
use crate::domain::Actor;
use crate::state::SharedState;

pub async fn cmd_sync(config: Config, item_type_id: Option<i32>) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let report = state
        .inventory_service
        .sync_inventory(&Actor::system(), item_type_id)
        .await?;

    println!("Checked {} item types", report.checked);
    if report.fixed == 0 {
        println!("Inventory is consistent.");
    } else {
        println!("Corrected {} records", report.fixed);
    }

    Ok(())
}

pub async fn cmd_snapshot(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let count = crate::scheduler::take_snapshot(&state).await?;
    println!("Recorded {count} inventory snapshots");
    Ok(())
}
