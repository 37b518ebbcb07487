use std::{error::Error, fmt, sync::Arc};

use surrealdb::{Connection, Surreal};

use crate::parsers::{NormalizeError, WorkbookParseError};
use crate::report::{ExportError, ReportHeading};
use crate::store::{StoreError, SurrealResultStore};

pub mod data;
pub mod ingest;

pub use data::SearchResults;
pub use ingest::{AppendReport, ConversionReport};

#[derive(Debug)]
pub enum ControlError {
    Workbook(WorkbookParseError),
    Normalize(NormalizeError),
    InvalidInput(String),
    Store(StoreError),
    Export(ExportError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(err) => write!(f, "{err}"),
            Self::Normalize(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlError {}

impl From<WorkbookParseError> for ControlError {
    fn from(err: WorkbookParseError) -> Self {
        Self::Workbook(err)
    }
}

impl From<NormalizeError> for ControlError {
    fn from(err: NormalizeError) -> Self {
        Self::Normalize(err)
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ExportError> for ControlError {
    fn from(err: ExportError) -> Self {
        Self::Export(err)
    }
}

/// Operations behind the API and the pages, bound to one record store.
pub struct ResultsControlPlane<C: Connection> {
    store: SurrealResultStore<C>,
    heading: ReportHeading,
}

impl<C: Connection> Clone for ResultsControlPlane<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            heading: self.heading.clone(),
        }
    }
}

impl<C: Connection> ResultsControlPlane<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_store(SurrealResultStore::new(db))
    }

    pub fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self::with_store(SurrealResultStore::from_arc(db))
    }

    pub fn with_store(store: SurrealResultStore<C>) -> Self {
        Self {
            store,
            heading: ReportHeading::default(),
        }
    }

    #[must_use]
    pub fn with_heading(mut self, heading: ReportHeading) -> Self {
        self.heading = heading;
        self
    }

    pub const fn store(&self) -> &SurrealResultStore<C> {
        &self.store
    }

    pub const fn heading(&self) -> &ReportHeading {
        &self.heading
    }
}
