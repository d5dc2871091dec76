//! The five listings and a runtime selector over them.

mod announcements;
mod companies;
mod evaluations;
mod orderers;
mod partners;

use std::fmt;
use std::str::FromStr;

use bidboard_core::{BidboardError, FlatRow};

use crate::limit::Limit;
use crate::resource::{materialize, render_query, Resource};

pub use announcements::{Announcement, Announcements, Department};
pub use companies::{Branch, Companies, Company};
pub use evaluations::{CompanySummary, EvaluatedAnnouncement, Evaluation, Evaluations, RequirementResult};
pub use orderers::{Orderer, Orderers};
pub use partners::{
    OrdererQualifications, PastProject, Partner, PartnerBranch, Partners, QualificationItem,
    Qualifications, RecordKind, UnifiedQualification,
};

/// Listing chosen at runtime (CLI arguments, logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Evaluations,
    Announcements,
    Companies,
    Orderers,
    Partners,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Evaluations,
        ResourceKind::Announcements,
        ResourceKind::Companies,
        ResourceKind::Orderers,
        ResourceKind::Partners,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Evaluations => Evaluations::NAME,
            ResourceKind::Announcements => Announcements::NAME,
            ResourceKind::Companies => Companies::NAME,
            ResourceKind::Orderers => Orderers::NAME,
            ResourceKind::Partners => Partners::NAME,
        }
    }

    pub fn render_query(self, table_prefix: &str, limit: Limit) -> String {
        match self {
            ResourceKind::Evaluations => render_query::<Evaluations>(table_prefix, limit),
            ResourceKind::Announcements => render_query::<Announcements>(table_prefix, limit),
            ResourceKind::Companies => render_query::<Companies>(table_prefix, limit),
            ResourceKind::Orderers => render_query::<Orderers>(table_prefix, limit),
            ResourceKind::Partners => render_query::<Partners>(table_prefix, limit),
        }
    }

    /// Materialize rows into the listing's JSON array.
    pub fn shape_json(self, rows: Vec<FlatRow>, limit: Limit) -> Result<serde_json::Value, BidboardError> {
        let value = match self {
            ResourceKind::Evaluations => serde_json::to_value(materialize::<Evaluations>(rows, limit))?,
            ResourceKind::Announcements => serde_json::to_value(materialize::<Announcements>(rows, limit))?,
            ResourceKind::Companies => serde_json::to_value(materialize::<Companies>(rows, limit))?,
            ResourceKind::Orderers => serde_json::to_value(materialize::<Orderers>(rows, limit))?,
            ResourceKind::Partners => serde_json::to_value(materialize::<Partners>(rows, limit))?,
        };
        Ok(value)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = BidboardError;

    /// Accepts the listing name, case-insensitively. `result` is the legacy
    /// name of the evaluations listing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "result" {
            return Ok(ResourceKind::Evaluations);
        }
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| BidboardError::UnknownResource(s.to_string()))
    }
}
