use crate::config::Config;
use crate::domain::Actor;
use crate::state::SharedState;

pub async fn cmd_reset(config: Config, phrase: &str, code: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let report = state
        .system_service
        .reset_system(&Actor::system(), phrase, code)
        .await?;

    println!("System reset complete.");
    println!("  Base ID:       {}", report.base_id);
    println!("  Department ID: {}", report.department_id);
    println!("  Accounts:      {}", report.user_ids.len());
    println!("Default accounts log in with their phone number as password.");

    Ok(())
}
