use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::artifact::ArtifactFile;

/// TeamCity's compact timestamp layout, e.g. `20240131T235959+0100`.
const FINISH_DATE_FORMAT: &str = "%Y%m%dT%H%M%S%z";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u64,
    #[serde(default)]
    pub build_type_id: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub finish_date: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub web_url: String,

    // Filled in by the aggregator from the artifact listing
    #[serde(skip)]
    pub files: Vec<ArtifactFile>,
}

impl Build {
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_str(&self.finish_date, FINISH_DATE_FORMAT)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// Completion time as `YYYY-MM-DD HH:MM:SS UTC`; the raw value when it can't be parsed.
    pub fn finished_str(&self) -> String {
        match self.finished_at() {
            Some(d) => d.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => self.finish_date.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildList {
    #[serde(rename = "build", default)]
    pub builds: Vec<Build>,
}
