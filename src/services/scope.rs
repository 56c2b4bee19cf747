use anyhow::Result;

use crate::db::Store;
use crate::domain::{Actor, Role};

/// Departments whose stock the actor can see. `None` means all of them.
pub async fn visible_departments(store: &Store, actor: &Actor) -> Result<Option<Vec<i32>>> {
    let ids = match actor.role {
        Role::SuperAdmin => return Ok(None),
        Role::HqCommander => match actor.base_id {
            Some(base_id) => store.org().department_ids_in_base(base_id).await?,
            None => Vec::new(),
        },
        Role::DeptCommander => actor.department_id.into_iter().collect(),
        Role::Soldier => match actor.user_id {
            Some(user_id) => {
                store
                    .org()
                    .borrowable_departments(user_id, actor.department_id)
                    .await?
            }
            None => Vec::new(),
        },
    };
    Ok(Some(ids))
}
