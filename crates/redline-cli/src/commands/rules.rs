use anyhow::Result;
use redline_config::Config;

use crate::cli::OutputFormat;

pub async fn handle(config: &Config, format: OutputFormat) -> Result<()> {
    let rules = super::client(config)?.rules().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rules)?),
        OutputFormat::Text => {
            if rules.is_empty() {
                println!("No rules.");
                return Ok(());
            }
            println!("Rules:");
            for rule in rules {
                let marker = if config.scan.rules.is_empty() || config.scan.rules.contains(&rule) {
                    "*"
                } else {
                    " "
                };
                println!("  {} {}", marker, rule);
            }
        }
    }

    Ok(())
}
