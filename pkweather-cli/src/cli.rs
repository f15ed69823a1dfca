use std::{fmt, path::PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use pkweather_core::{Config, CountryConfig, ErrorKind, ReportFormatter, provider_from_config};

use crate::session::Session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "pkweather",
    version,
    about = "Current weather for Pakistani cities"
)]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true, env = "PKWEATHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show the current weather for a city.
    Show {
        /// City name, e.g. "Lahore".
        city: String,

        /// Also save the report to this file.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Menu-driven session: check, save, clear, quit.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(config_path),
            Command::Show { city, save } => {
                let config = Config::load_with_env(&config_path)?;
                show(&config, &city, save).await
            }
            Command::Interactive => {
                let config = Config::load_with_env(&config_path)?;
                interactive(&config).await
            }
        }
    }
}

fn configure(path: PathBuf) -> anyhow::Result<()> {
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save_to(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let provider = provider_from_config(config)?;
    let formatter = ReportFormatter::for_country(&config.country)?;
    Ok(Session::new(provider, formatter))
}

async fn show(config: &Config, city: &str, save: Option<PathBuf>) -> anyhow::Result<()> {
    let mut session = open_session(config)?;

    if let Some(banner) = fetching_banner(city, &config.country) {
        println!("{banner}");
    }
    let report = session.check(city).await?;
    println!("{report}");

    if let Some(path) = save {
        let written = session.save(&path)?;
        println!("\nReport saved to: {}", written.display());
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Check,
    Save,
    Clear,
    Quit,
}

impl Action {
    const ALL: [Action; 4] = [Action::Check, Action::Save, Action::Clear, Action::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Check => "Check weather",
            Action::Save => "Save report",
            Action::Clear => "Clear",
            Action::Quit => "Quit",
        })
    }
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let mut session = open_session(config)?;
    let country = &config.country;

    println!("Weather Checker ({} Only)", country.name);
    println!(
        "Note: This version only supports cities within {}.\n",
        country.name
    );

    loop {
        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(err) if is_cancel(&err) => break,
            Err(err) => return Err(err).context("Failed to read menu choice"),
        };

        match action {
            Action::Check => {
                let prompt = format!("Enter {} city name:", country.demonym);
                let city = match Text::new(&prompt).prompt() {
                    Ok(city) => city,
                    Err(err) if is_cancel(&err) => continue,
                    Err(err) => return Err(err).context("Failed to read city name"),
                };

                if let Some(banner) = fetching_banner(&city, country) {
                    println!("{banner}");
                }
                match session.check(&city).await {
                    Ok(report) => println!("{report}\n"),
                    Err(err) if err.kind() == ErrorKind::InvalidInput => println!("{err}\n"),
                    Err(err) => println!("Error: {err}\n"),
                }
            }
            Action::Save => {
                if session.last_report().is_none() {
                    println!("No report to save. Please fetch weather first.\n");
                    continue;
                }

                let path = match Text::new("Save report as...")
                    .with_default("weather_report.txt")
                    .prompt()
                {
                    Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
                    Ok(_) => continue,
                    Err(err) if is_cancel(&err) => continue,
                    Err(err) => return Err(err).context("Failed to read file name"),
                };

                match session.save(&path) {
                    Ok(written) => println!("Report saved to: {}\n", written.display()),
                    Err(err) => println!("Error: {err}\n"),
                }
            }
            Action::Clear => {
                session.clear();
                println!("Cleared.\n");
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Nothing is announced for blank input, which never gets dispatched.
fn fetching_banner(city: &str, country: &CountryConfig) -> Option<String> {
    let city = city.trim();
    if city.is_empty() {
        return None;
    }
    Some(format!("Fetching weather for '{city}, {}'...", country.name))
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}
