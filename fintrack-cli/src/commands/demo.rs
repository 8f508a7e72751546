//! Demo command - manage demo mode

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use fintrack_core::config::Config;

use super::get_fintrack_dir;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off,
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    let fintrack_dir = get_fintrack_dir()?;
    std::fs::create_dir_all(&fintrack_dir)?;

    match command {
        Some(DemoCommands::On) => {
            let mut config = Config::load_file(&fintrack_dir)?;
            config.enable_demo_mode();
            config.save(&fintrack_dir)?;
            println!("{}", "Demo mode enabled".green());
            println!("You are signed in as the demo user. Run 'ft dashboard' to see sample data.");
            Ok(())
        }
        Some(DemoCommands::Off) => {
            let mut config = Config::load_file(&fintrack_dir)?;
            config.disable_demo_mode();
            config.save(&fintrack_dir)?;
            println!("{}", "Demo mode disabled".yellow());
            Ok(())
        }
        Some(DemoCommands::Status) | None => {
            if Config::load(&fintrack_dir)?.demo_mode {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
            Ok(())
        }
    }
}
