use chrono::Utc;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_overdue(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let marked = crate::scheduler::run_overdue_sweep(&state).await?;

    if marked == 0 {
        println!("No overdue loans as of {}", Utc::now().format("%Y-%m-%d %H:%M"));
    } else {
        println!("Marked {marked} requests as overdue");
    }

    Ok(())
}
