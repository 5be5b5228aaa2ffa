//! `studyquest config`: read and edit `config.toml` by dot-path key.

use clap::Subcommand;
use studyquest_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `deadlines.warning_days`
    Get { key: String },
    /// Change one value; an empty string clears `syllabus_path`
    Set { key: String, value: String },
    /// Print the whole config as JSON
    List,
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    if let ConfigAction::Reset = action {
        Config::default().save()?;
        println!("config reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => {
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            tracing::info!(%key, "config updated");
            println!("{key} = {}", config.get(&key).unwrap_or_default());
        }
        ConfigAction::List => println!("{}", serde_json::to_string_pretty(&config)?),
        ConfigAction::Reset => {}
    }
    Ok(())
}
