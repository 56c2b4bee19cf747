mod init;
mod inventory;
mod overdue;
mod reset;
mod token;

pub use init::cmd_init;
pub use inventory::{cmd_snapshot, cmd_sync};
pub use overdue::cmd_overdue;
pub use reset::cmd_reset;
pub use token::cmd_token;
