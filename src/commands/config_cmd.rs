use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            let path = cli_config_path.unwrap_or_else(Config::default_config_path);
                            println!("Config file: {} (not found)", path.display());
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("download_dir: {}", config.download_dir.value.display());
                        println!("  source: {}", config.download_dir.source);
                        println!();

                        match &config.font_path.value {
                            Some(path) => println!("font_path: {}", path.display()),
                            None => println!("font_path: (system font)"),
                        }
                        println!("  source: {}", config.font_path.source);
                        println!();

                        match &config.share.command {
                            Some(command) => println!("share.command: {}", command.join(" ")),
                            None => println!("share.command: (not set, cards are saved)"),
                        }
                        println!("webhook.timeout_secs: {}", config.webhook.timeout_secs);
                        println!("webhook.grace_secs: {}", config.webhook.grace_secs);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'procure config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let default_config = r#"# procure configuration

# Where records and settings are stored (default: platform data dir)
# data_dir: ~/.local/share/procure

# Where cards are saved when sharing is unavailable (default: Downloads)
# download_dir: ~/Downloads

# Font with CJK coverage for card text (default: first system font found)
# font_path: /usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc

# share:
#   command: ["xdg-open", "{file}"]

webhook:
  timeout_secs: 10
  grace_secs: 5
"#;

                let mut file = fs::File::create(&config_path)?;
                file.write_all(default_config.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
