pub mod client;
pub mod config;
pub mod epic;
pub mod error;
pub mod labels;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod row;
pub mod sink;
pub mod status_directory;
pub mod time_in_status;

pub use client::{ApiNamespace, Auth, JiraClient, JiraConfig};
pub use error::{Error, Result};
pub use models::*;

// Pipeline re-exports
pub use pipeline::{ExtractOptions, ExtractionPipeline, PageState};

// Collaborator re-exports
pub use config::{ExtractConfig, FilterId, JiraSection};
pub use epic::{EpicName, EpicResolver};
pub use labels::{LabelLookup, TeamCategoryResolver, resolve_team};
pub use query::{QuerySource, ResolvedQuery};
pub use row::{ColumnSet, DerivedRow};
pub use sink::{CsvSink, TabularSink};
pub use status_directory::StatusDirectory;
pub use time_in_status::{StatusRecord, TimeInStatus, TrackedStatus, millis_to_days};
