use clap::{Args, Subcommand};

use procure_core::Tab;

use super::{confirm, screen_header, App, OutputFormat};

#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show supplier, colors and webhook target
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the default supplier
    Supplier { name: String },

    /// Set the webhook URL (omit to clear)
    Webhook { url: Option<String> },

    /// Set the target group shown in share captions (omit to clear)
    Group { name: Option<String> },

    /// Add a preset color
    AddColor { color: String },

    /// Remove a preset color
    RemoveColor { color: String },

    /// Delete all records (settings are kept)
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Restore the default supplier, colors, webhook and group
    ResetPresets {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl SettingsCommand {
    pub fn run(&self, app: &mut App) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SettingsSubcommand::Show { format } => {
                let header = screen_header(app, Tab::Settings);
                let presets = app.presets();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(presets)?);
                    }
                    OutputFormat::Text => {
                        println!("{}\n", header);
                        println!("supplier: {}", or_unset(&presets.supplier));
                        println!("colors:   {}", presets.colors.join(" "));
                        println!("webhook:  {}", presets.webhook().unwrap_or("(not set)"));
                        println!("group:    {}", presets.group().unwrap_or("(not set)"));
                    }
                }
                Ok(())
            }

            SettingsSubcommand::Supplier { name } => {
                app.set_supplier(name.trim())?;
                println!("Supplier set to: {}", or_unset(name.trim()));
                Ok(())
            }

            SettingsSubcommand::Webhook { url } => {
                let url = url.as_deref().unwrap_or_default();
                app.set_webhook(url)?;
                match app.presets().webhook() {
                    Some(url) => println!("Webhook set to: {}", url),
                    None => println!("Webhook cleared."),
                }
                Ok(())
            }

            SettingsSubcommand::Group { name } => {
                let name = name.as_deref().unwrap_or_default();
                app.set_target_group(name)?;
                match app.presets().group() {
                    Some(group) => println!("Target group set to: {}", group),
                    None => println!("Target group cleared."),
                }
                Ok(())
            }

            SettingsSubcommand::AddColor { color } => {
                if app.add_color(color)? {
                    println!("Added color: {}", color.trim());
                } else {
                    println!("Color already present or blank: {}", color);
                }
                Ok(())
            }

            SettingsSubcommand::RemoveColor { color } => {
                if app.remove_color(color)? {
                    println!("Removed color: {}", color.trim());
                } else {
                    println!("Color not found: {}", color);
                }
                Ok(())
            }

            SettingsSubcommand::Reset { force } => {
                if !force && !confirm("Delete ALL records?")? {
                    println!("Reset cancelled.");
                    return Ok(());
                }
                let removed = app.clear_all()?;
                println!("Deleted {} record(s).", removed);
                Ok(())
            }

            SettingsSubcommand::ResetPresets { force } => {
                if !force && !confirm("Restore default supplier, colors, webhook and group?")? {
                    println!("Reset cancelled.");
                    return Ok(());
                }
                app.reset_presets()?;
                println!("Restored default settings.");
                Ok(())
            }
        }
    }
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}
