use anyhow::{Result, bail};
use redline_config::Config;

pub async fn handle(config: &Config) -> Result<()> {
    let client = super::client(config)?;

    if client.health().await? {
        println!("✓ {} is up", client.base_url());
        Ok(())
    } else {
        bail!("{} answered but did not report ok", client.base_url())
    }
}
