use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_token(config: Config, user_id: i32) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let issued = state.storefront_service.issue_for_user(user_id).await?;

    println!("{}", issued.token);
    println!("Expires at {}", issued.expires_at.to_rfc3339());

    Ok(())
}
