use anyhow::Result;
use redline_config::Config;

use crate::cli::OutputFormat;

pub async fn handle(config: &Config, format: OutputFormat) -> Result<()> {
    let presets = super::client(config)?.patterns().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&presets)?),
        OutputFormat::Text => {
            if presets.is_empty() {
                println!("No preset patterns.");
                return Ok(());
            }
            println!("Preset patterns ({}):", presets.len());
            for preset in &presets {
                match preset.regex() {
                    Some(regex) => println!("  {}  {}", preset.name, regex),
                    None => println!("  {}", preset.name),
                }
            }
        }
    }

    Ok(())
}
