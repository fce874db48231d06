/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When AppConfig schema changes
*/

use anyhow::Result;
use carbonhub_adapter::AccountType;
use console::style;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use carbonhub_cli::config::AppConfig;

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to CarbonHub Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a new client configuration.").dim()
    );

    let theme = ColorfulTheme::default();
    let defaults = AppConfig::default();

    let api_host: String = Input::with_theme(&theme)
        .with_prompt("API host")
        .default(defaults.api_host.clone())
        .interact_text()?;

    println!("\n{}", style("--- Account ---").bold());
    let account_types = [AccountType::User, AccountType::Company];
    let selection = Select::with_theme(&theme)
        .with_prompt("Account type")
        .items(&account_types.map(|t| t.as_str()))
        .default(0)
        .interact()?;

    let key_path: String = Input::with_theme(&theme)
        .with_prompt("Wallet key file (empty for default)")
        .allow_empty(true)
        .interact_text()?;

    println!("\n{}", style("--- Refresh ---").bold());
    let price_refresh_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Price refresh interval (seconds)")
        .default(defaults.price_refresh_secs)
        .interact_text()?;

    let config = AppConfig {
        api_host,
        key_path: (!key_path.trim().is_empty()).then(|| PathBuf::from(key_path.trim())),
        account_type: account_types[selection],
        price_refresh_secs,
        ..defaults
    };
    config.save(&output)?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}
