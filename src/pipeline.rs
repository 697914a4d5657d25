//! # Label Pipeline
//!
//! Resolve, compose and write, one identifier at a time:
//!
//! ```text
//! id -> Resolver -> ResolvedRecord -> Composer -> LabelCanvas -> PageSink
//!          |
//!          '-> unresolved: recorded in RunReport::invalid_ids
//! ```
//!
//! Each record and each label is dropped before the next identifier starts.

use crate::error::LabelError;
use crate::render::Composer;
use crate::resolve::{RecordSource, Resolution, Resolver};
use crate::sheet::PageSink;

/// What one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Labels handed to the sink
    pub pages_written: usize,
    /// Identifiers that resolved to nothing, in input order
    pub invalid_ids: Vec<u64>,
}

impl RunReport {
    pub fn has_invalid(&self) -> bool {
        !self.invalid_ids.is_empty()
    }
}

/// Render one label per resolvable identifier into `sink`.
///
/// Unresolvable identifiers are skipped and reported. Errors from composing
/// or writing a label abort the run.
pub async fn generate_sheet<S, P>(
    ids: &[u64],
    source: &S,
    composer: &Composer,
    sink: &mut P,
) -> Result<RunReport, LabelError>
where
    S: RecordSource + ?Sized,
    P: PageSink + ?Sized,
{
    let resolver = Resolver::new(source);
    let mut report = RunReport::default();

    for &id in ids {
        let record = match resolver.resolve(id).await {
            Resolution::Found(record) => record,
            Resolution::NotFound => {
                tracing::warn!(id, "Identifier could not be found or accessed");
                report.invalid_ids.push(id);
                continue;
            }
        };

        let label = composer.compose(&record)?;
        sink.add_page(&label)?;
        report.pages_written += 1;

        tracing::info!(id, name = %record.display_name, "Wrote label");
    }

    Ok(report)
}
