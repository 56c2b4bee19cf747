use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings.");
        println!("A storefront token secret was generated. Review the reset confirmation values before serving.");
    } else {
        println!("config.toml already exists, leaving it unchanged.");
    }
    Ok(())
}
