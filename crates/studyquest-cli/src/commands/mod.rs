pub mod chapter;
pub mod config;
pub mod deadlines;
pub mod parent;
pub mod plan;
pub mod progress;
pub mod settings;
pub mod subtopic;
pub mod syllabus;

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use studyquest_core::{Config, Event, ProgressStore, Session, Syllabus, ValidationError};

/// Everything a command needs: config, store, syllabus and the acting user.
pub struct Context {
    pub config: Config,
    pub store: ProgressStore,
    pub syllabus: Syllabus,
    pub user: String,
}

impl Context {
    pub fn open(user: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let store = ProgressStore::open()?;
        let syllabus = match &config.syllabus_path {
            Some(path) => Syllabus::load(Path::new(path))?,
            None => Syllabus::bundled(),
        };
        let user = user.unwrap_or_else(|| config.default_user.clone());
        Ok(Self {
            config,
            store,
            syllabus,
            user,
        })
    }

    /// Start the acting user's session as of now, in local time.
    pub fn session(&self) -> Result<Session<'_>, Box<dyn std::error::Error>> {
        let (session, events) =
            Session::start(&self.store, &self.syllabus, &self.user, &Local::now())?;
        for event in &events {
            tracing::info!(?event, "session start");
        }
        Ok(session)
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    studyquest_core::deadlines::parse_date(value)
}

/// Result of a progress-changing command, printed as JSON.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome<'a> {
    pub experience: u64,
    pub level: u64,
    pub events: &'a [Event],
}

pub fn print_outcome(
    session: &Session<'_>,
    events: &[Event],
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = Outcome {
        experience: session.record().experience,
        level: session.record().level,
        events,
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
