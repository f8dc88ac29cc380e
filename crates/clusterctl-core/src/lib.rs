pub mod action;
pub mod audit;
pub mod config;
pub mod database;
pub mod error;
pub mod event;
pub mod executor;
pub mod io;
pub mod paths;
pub mod plan;
pub mod report;
pub mod sqlite;
pub mod summary;

pub use action::{Action, CommandResult, ExecutionOutcome};
pub use database::Database;
pub use error::{ClusterctlError, Result};
pub use event::{EventSink, ExecutionEvent, TracingSink};
pub use executor::Executor;
pub use summary::{ActionError, ExecutionSummary};
