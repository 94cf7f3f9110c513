//! Vendor reference configurations.
//!
//! LDO publishes a printer.cfg per printer, board and board revision. The
//! table below lists them so users can compare generated output against the
//! vendor's file. Fetching needs the `web` feature and is never part of
//! compilation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Reference lookup and fetch errors.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// No reference for the (printer, board, revision) triple
    #[error("No reference config for {printer}/{board}/{revision}")]
    NotFound {
        /// Requested printer key
        printer: String,
        /// Requested board key
        board: String,
        /// Requested revision
        revision: String,
    },

    /// The remote host answered with a non-success status
    #[error("Fetching {url} returned HTTP {status}")]
    Status {
        /// Source URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The fetch did not finish in time
    #[error("Fetching {url} timed out after {timeout:?}")]
    Timeout {
        /// Source URL
        url: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// Connection or decoding failure
    #[error("Fetching {url} failed: {message}")]
    Fetch {
        /// Source URL
        url: String,
        /// Underlying error description
        message: String,
    },
}

/// One published vendor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Printer catalog key
    pub printer: &'static str,
    /// Board family
    pub board: &'static str,
    /// Board revision
    pub revision: &'static str,
    /// Board and revision name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Raw file URL
    pub url: &'static str,
}

static REFERENCES: [ReferenceEntry; 6] = [
    ReferenceEntry {
        printer: "voron2.4",
        board: "leviathan",
        revision: "rev_d",
        name: "Leviathan Rev D",
        description: "Latest LDO Leviathan config for Voron 2.4",
        url: "https://raw.githubusercontent.com/MotorDynamicsLab/LDOVoron2/main/Firmware/leviathan-printer-rev-d.cfg",
    },
    ReferenceEntry {
        printer: "voron2.4",
        board: "octopus",
        revision: "rev_c",
        name: "Octopus Rev C",
        description: "Latest LDO Octopus config for Voron 2.4",
        url: "https://raw.githubusercontent.com/MotorDynamicsLab/LDOVoron2/main/Firmware/octopus-printer-rev-c.cfg",
    },
    ReferenceEntry {
        printer: "voron2.4",
        board: "octopus",
        revision: "rev_a",
        name: "Octopus Rev A",
        description: "Legacy LDO Octopus config for Voron 2.4",
        url: "https://raw.githubusercontent.com/MotorDynamicsLab/LDOVoron2/main/Firmware/octopus-printer-rev-a.cfg",
    },
    ReferenceEntry {
        printer: "trident",
        board: "leviathan",
        revision: "rev_d",
        name: "Leviathan Rev D",
        description: "Latest LDO Leviathan config for Trident",
        url: "https://raw.githubusercontent.com/MotorDynamicsLab/LDOVoronTrident/master/Firmware/printer-leviathan-rev-d.cfg",
    },
    ReferenceEntry {
        printer: "trident",
        board: "octopus",
        revision: "rev_c",
        name: "Octopus Rev C",
        description: "Latest LDO Octopus config for Trident",
        url: "https://raw.githubusercontent.com/MotorDynamicsLab/LDOVoronTrident/master/Firmware/printer-octopus-rev-c.cfg",
    },
    ReferenceEntry {
        printer: "trident",
        board: "octopus",
        revision: "rev_a",
        name: "Octopus Rev A",
        description: "Legacy LDO Octopus config for Trident",
        url: "https://raw.githubusercontent.com/MotorDynamicsLab/LDOVoronTrident/master/Firmware/printer-octopus-rev-a.cfg",
    },
];

/// Host every reference URL is published on.
const UPSTREAM: &str = "https://raw.githubusercontent.com";

impl ReferenceEntry {
    /// Source URL, served from `mirror` instead of GitHub when set.
    #[must_use]
    pub fn url_via(&self, mirror: Option<&str>) -> String {
        match (mirror, self.url.strip_prefix(UPSTREAM)) {
            (Some(mirror), Some(path)) => format!("{}{path}", mirror.trim_end_matches('/')),
            _ => self.url.to_string(),
        }
    }

    /// Unique `printer_board_revision` key.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.printer, self.board, self.revision)
    }

    /// Name prefixed with the short printer name, e.g. "2.4 Leviathan Rev D".
    #[must_use]
    pub fn display_name(&self) -> String {
        let printer = match self.printer {
            "voron2.4" => "2.4",
            "trident" => "Trident",
            other => other,
        };
        format!("{printer} {}", self.name)
    }
}

/// Every known reference config.
#[must_use]
pub fn all() -> &'static [ReferenceEntry] {
    &REFERENCES
}

/// Finds the reference for a (printer, board, revision) triple.
pub fn find(
    printer: &str,
    board: &str,
    revision: &str,
) -> Result<&'static ReferenceEntry, ReferenceError> {
    REFERENCES
        .iter()
        .find(|r| r.printer == printer && r.board == board && r.revision == revision)
        .ok_or_else(|| ReferenceError::NotFound {
            printer: printer.to_string(),
            board: board.to_string(),
            revision: revision.to_string(),
        })
}

/// Listing entry as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceListing {
    /// Display name including the printer
    pub name: String,
    /// Short description
    pub description: &'static str,
    /// Raw file URL
    pub url: &'static str,
    /// Printer catalog key
    pub printer_type: &'static str,
    /// Board family
    pub board_type: &'static str,
    /// Board revision
    pub revision: &'static str,
}

/// Every reference keyed by [`ReferenceEntry::key`].
#[must_use]
pub fn listing() -> BTreeMap<String, ReferenceListing> {
    REFERENCES
        .iter()
        .map(|r| {
            (
                r.key(),
                ReferenceListing {
                    name: r.display_name(),
                    description: r.description,
                    url: r.url,
                    printer_type: r.printer,
                    board_type: r.board,
                    revision: r.revision,
                },
            )
        })
        .collect()
}

/// Downloads a reference config from `url`, bounded by `timeout`.
#[cfg(feature = "web")]
pub async fn fetch(url: &str, timeout: Duration) -> Result<String, ReferenceError> {
    let failed = |e: reqwest::Error| {
        if e.is_timeout() {
            ReferenceError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            ReferenceError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(&failed)?;

    tracing::debug!("Fetching reference config {url}");
    let response = client.get(url).send().await.map_err(&failed)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ReferenceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(&failed)
}
