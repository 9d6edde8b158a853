//! # Election Import
//!
//! Out-of-band seeding of the booth store. The booth itself never writes the
//! roll, candidates, directors or settings, this is the only place that does.
//!
//! ## Input
//!
//! A single JSON file.
//! ```json
//! {
//!     "directors": [{ "username": "chief", "password": "..." }],
//!     "registrations": [{ "registration_number": "cs/21/001", "student_name": "Ada Lovelace" }],
//!     "candidates": [{ "id": 1, "name": "Ada Lovelace", "position": "President", "photo_url": "" }],
//!     "deadline": "2025-03-01T17:00:00Z"
//! }
//! ```
//!
//! ## Notes
//! - Registration numbers are normalized the same way the booth normalizes them
//! - Candidates are appended, importing the same file twice duplicates them
//! - Roll entries and directors are keyed, re-importing overwrites them
use std::{fs, path::Path};

use anyhow::{Context, bail};
use ballot::{
    database::{DEADLINE_KEY, Store},
    models::{Candidate, Director, Registration},
    utils::{normalize_reg_number, parse_deadline},
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ElectionFile {
    pub directors: Vec<Director>,
    pub registrations: Vec<Registration>,
    pub candidates: Vec<Candidate>,
    pub deadline: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub directors: usize,
    pub registrations: usize,
    pub candidates: usize,
    pub skipped: usize,
}

impl ElectionFile {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&raw).with_context(|| format!("Malformed {}", path.display()))
    }

    fn len(&self) -> u64 {
        (self.directors.len() + self.registrations.len() + self.candidates.len()) as u64
    }
}

pub fn progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    Ok(pb)
}

pub async fn import_election<S: Store>(
    store: &S,
    election: ElectionFile,
    pb: &ProgressBar,
) -> anyhow::Result<Summary> {
    if let Some(deadline) = &election.deadline {
        if parse_deadline(deadline).is_none() {
            bail!("Unreadable deadline {deadline:?}");
        }
    }

    pb.set_length(election.len());
    let mut summary = Summary::default();

    pb.set_message("Directors");
    for director in &election.directors {
        store.put_director(director).await?;
        summary.directors += 1;
        pb.inc(1);
    }

    pb.set_message("Registrations");
    for registration in election.registrations {
        let registration_number = normalize_reg_number(&registration.registration_number);

        if registration_number.is_empty() || registration.student_name.trim().is_empty() {
            pb.println(format!("Skipping incomplete roll entry {registration:?}"));
            summary.skipped += 1;
        } else {
            store
                .put_registration(&Registration {
                    registration_number,
                    student_name: registration.student_name.trim().to_string(),
                })
                .await?;
            summary.registrations += 1;
        }

        pb.inc(1);
    }

    pb.set_message("Candidates");
    for candidate in &election.candidates {
        store.put_candidate(candidate).await?;
        summary.candidates += 1;
        pb.inc(1);
    }

    if let Some(deadline) = &election.deadline {
        store.put_setting(DEADLINE_KEY, deadline.trim()).await?;
    }

    pb.finish_with_message("Done");

    Ok(summary)
}
