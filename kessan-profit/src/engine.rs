//! The two entry points: `compute` (full pipeline) and `validate` (parse and
//! normalise only).
//!
//! Files are processed one after another in input order. Every data row ends
//! up either as an accepted transaction or as exactly one diagnostic.

use chrono::NaiveDate;
use kessan_core::{
    BatchError, CanonicalTransaction, Diagnostic, EngineConfig, FileSummary, Report, RowError,
    RowOrigin, SourceSchema,
};
use kessan_ingest::{RawRow, RowFailure, SchemaDescriptor, SourceFile, normalize, read_rows};
use std::collections::HashMap;

use crate::aggregator::MonthlyAggregator;
use crate::profit;
use crate::report_builder;
use crate::resolver::AccountResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Validate,
    Compute,
}

/// Two rows with the same key are the same sale seen twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DuplicateKey {
    schema: SourceSchema,
    identifier: String,
    order_date: NaiveDate,
    revenue: i64,
    fee: i64,
}

impl DuplicateKey {
    fn of(txn: &CanonicalTransaction) -> Self {
        Self {
            schema: txn.source_schema,
            identifier: txn.raw_identifier.clone(),
            order_date: txn.order_date,
            revenue: txn.revenue_amount,
            fee: txn.fee_amount,
        }
    }
}

struct FileOutcome {
    summary: FileSummary,
    accepted: Vec<CanonicalTransaction>,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the whole pipeline over a batch.
    ///
    /// Fails only when no file survived structural validation; bad rows and
    /// bad files otherwise travel in the report's diagnostics.
    pub fn compute(&self, files: &[SourceFile]) -> Result<Report, BatchError> {
        let mut seen = HashMap::new();
        let outcomes: Vec<FileOutcome> = files
            .iter()
            .map(|file| self.ingest_file(file, Pass::Compute, &mut seen))
            .collect();

        if outcomes.iter().all(|o| o.summary.failed) {
            tracing::warn!(files = files.len(), "no file in the batch could be read");
            return Err(BatchError::NoValidData {
                files: files.len(),
                diagnostics: outcomes.into_iter().flat_map(|o| o.diagnostics).collect(),
            });
        }

        let mut aggregator = MonthlyAggregator::new();
        let mut summaries = Vec::with_capacity(outcomes.len());
        let mut diagnostics = Vec::new();
        for outcome in outcomes {
            for txn in &outcome.accepted {
                aggregator.add(txn).map_err(|e| BatchError::Unaggregated {
                    identifier: e.identifier().to_string(),
                })?;
            }
            summaries.push(outcome.summary);
            diagnostics.extend(outcome.diagnostics);
        }

        let report = report_builder::build(aggregator.finish(), summaries, diagnostics);
        tracing::info!(
            buckets = report.buckets.len(),
            transactions = report.summary.totals.transaction_count,
            diagnostics = report.diagnostics.len(),
            "report built"
        );
        Ok(report)
    }

    /// Parse and normalise every file without resolving or aggregating.
    pub fn validate(&self, files: &[SourceFile]) -> Vec<Diagnostic> {
        let mut seen = HashMap::new();
        files
            .iter()
            .flat_map(|file| self.ingest_file(file, Pass::Validate, &mut seen).diagnostics)
            .collect()
    }

    fn ingest_file(
        &self,
        file: &SourceFile,
        pass: Pass,
        seen: &mut HashMap<DuplicateKey, RowOrigin>,
    ) -> FileOutcome {
        let mut outcome = FileOutcome {
            summary: FileSummary::new(&file.name, file.schema, &file.account_slot),
            accepted: Vec::new(),
            diagnostics: Vec::new(),
        };

        let mut reader = match read_rows(file, &self.config.limits) {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!(file = %file.name, schema = %file.schema, error = %e, "file rejected");
                outcome.summary.failed = true;
                outcome.diagnostics.push(Diagnostic::for_file(&file.name, &e));
                return outcome;
            }
        };
        outcome.summary.encoding = Some(reader.encoding().label().to_string());

        let descriptor = SchemaDescriptor::for_schema(file.schema);
        for item in reader.by_ref() {
            let (row_result, identifier) = match item {
                Ok(row) => {
                    let identifier = descriptor
                        .identifier
                        .value(&row)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string);
                    (self.process_row(&row, descriptor, file, pass, seen), identifier)
                }
                Err(RowFailure { line, error }) => (Err((line, error)), None),
            };

            match row_result {
                Ok(txn) => {
                    outcome.summary.rows_accepted += 1;
                    outcome.accepted.push(txn);
                }
                Err((line, error)) => {
                    tracing::debug!(
                        file = %file.name,
                        line,
                        code = error.code(),
                        error = %error,
                        "row rejected"
                    );
                    outcome.summary.rows_rejected += 1;
                    outcome
                        .diagnostics
                        .push(Diagnostic::for_row(&file.name, line, identifier, &error));
                }
            }
        }

        outcome.summary.rows_read = reader.rows_read() as u64;
        if let Some(limit) = reader.limit_error() {
            tracing::warn!(file = %file.name, error = %limit, "row limit reached");
            outcome.diagnostics.push(Diagnostic::for_file(&file.name, &limit));
        }

        tracing::info!(
            file = %file.name,
            schema = %file.schema,
            encoding = reader.encoding().label(),
            rows_read = outcome.summary.rows_read,
            accepted = outcome.summary.rows_accepted,
            rejected = outcome.summary.rows_rejected,
            "file processed"
        );
        outcome
    }

    fn process_row(
        &self,
        row: &RawRow,
        descriptor: &SchemaDescriptor,
        file: &SourceFile,
        pass: Pass,
        seen: &mut HashMap<DuplicateKey, RowOrigin>,
    ) -> Result<CanonicalTransaction, (u64, RowError)> {
        let reject = |error: RowError| (row.line, error);

        let txn = normalize(row, descriptor, &file.name).map_err(|e| reject(e.into()))?;
        if pass == Pass::Validate {
            return Ok(txn);
        }

        let txn = AccountResolver::new(&self.config)
            .resolve(txn, &file.account_slot)
            .map_err(|e| reject(e.into()))?;

        if let Some(first) = seen.get(&DuplicateKey::of(&txn)) {
            return Err(reject(RowError::Duplicate {
                file: first.file.clone(),
                line: first.line,
            }));
        }
        seen.insert(DuplicateKey::of(&txn), txn.origin.clone());

        Ok(profit::calculate(txn))
    }
}

/// [`Engine::compute`] with default configuration.
pub fn compute(files: &[SourceFile]) -> Result<Report, BatchError> {
    Engine::default().compute(files)
}

/// [`Engine::validate`] with default configuration.
pub fn validate(files: &[SourceFile]) -> Vec<Diagnostic> {
    Engine::default().validate(files)
}
