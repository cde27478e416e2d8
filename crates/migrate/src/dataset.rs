//! Seed datasets compiled into the binary.

use std::fmt;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use steward_db::models::case::UpsertCase;
use steward_db::models::donation::UpsertDonation;
use steward_db::models::project::UpsertProject;
use steward_db::models::task::UpsertTask;

const PROJECTS_JSON: &str = include_str!("../data/projects.json");
const TASKS_JSON: &str = include_str!("../data/tasks.json");
const CASES_JSON: &str = include_str!("../data/cases.json");
const DONATIONS_JSON: &str = include_str!("../data/donations.json");

/// What to migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Projects,
    Tasks,
    Cases,
    Donations,
    /// Every dataset, projects first.
    All,
}

impl Dataset {
    /// Concrete datasets to run, in dependency order.
    pub fn expand(self) -> Vec<Dataset> {
        match self {
            Dataset::All => vec![
                Dataset::Projects,
                Dataset::Cases,
                Dataset::Tasks,
                Dataset::Donations,
            ],
            single => vec![single],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Projects => "projects",
            Dataset::Tasks => "tasks",
            Dataset::Cases => "cases",
            Dataset::Donations => "donations",
            Dataset::All => "all",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn projects() -> Result<Vec<UpsertProject>, serde_json::Error> {
    parse(PROJECTS_JSON)
}

pub fn tasks() -> Result<Vec<UpsertTask>, serde_json::Error> {
    parse(TASKS_JSON)
}

pub fn cases() -> Result<Vec<UpsertCase>, serde_json::Error> {
    parse(CASES_JSON)
}

pub fn donations() -> Result<Vec<UpsertDonation>, serde_json::Error> {
    parse(DONATIONS_JSON)
}
