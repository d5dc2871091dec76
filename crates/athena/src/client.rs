//! AWS Athena query execution client.
//!
//! Provides [`AthenaClient`] for executing SQL queries against AWS Athena,
//! with exponential-backoff polling, timeout enforcement, scan-limit checks,
//! and paginated result fetching into [`AthenaQueryResult`].

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_athena::operation::get_query_results::GetQueryResultsOutput;
use aws_sdk_athena::types::QueryExecutionState;
use bidboard_core::FlatRow;
use tracing::{debug, error, info, warn};

use crate::config::AthenaConfig;
use crate::convert::result_to_rows;
use crate::result::{AthenaColumn, AthenaQueryResult, QueryMetadata};
use crate::source::{RowSource, RowSourceError};

/// Athena's hard cap on rows per `GetQueryResults` page.
const MAX_PAGE_SIZE: i32 = 1000;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur during Athena operations.
#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    /// Athena integration is disabled in configuration.
    #[error("Athena is not enabled in config")]
    NotEnabled,

    /// The query execution failed on the Athena side.
    #[error("Query {query_id} failed: {reason}")]
    QueryFailed { query_id: String, reason: String },

    /// The query was cancelled (either by an operator or by Athena).
    #[error("Query {query_id} was cancelled")]
    QueryCancelled { query_id: String },

    /// The query exceeded the configured timeout.
    #[error("Query {query_id} timed out after {seconds}s")]
    QueryTimeout { query_id: String, seconds: u32 },

    /// The query scanned more bytes than the configured limit.
    #[error("Scan limit exceeded: {bytes_scanned} bytes scanned, limit is {limit} bytes")]
    ScanLimitExceeded { bytes_scanned: u64, limit: u64 },

    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Failed to parse Athena result data.
    #[error("Parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for executing queries against AWS Athena.
///
/// Wraps the AWS SDK Athena client and adds:
/// - Exponential-backoff polling with jitter
/// - Timeout enforcement with automatic cancellation
/// - Scan-limit checking (post-execution)
/// - Result pagination until the last page
pub struct AthenaClient {
    config: AthenaConfig,
    athena_client: aws_sdk_athena::Client,
}

impl AthenaClient {
    /// Create a new [`AthenaClient`] from the given configuration.
    ///
    /// Returns [`AthenaError::NotEnabled`] if the config has Athena disabled.
    pub async fn new(config: AthenaConfig) -> Result<Self, AthenaError> {
        if !config.enabled {
            return Err(AthenaError::NotEnabled);
        }

        let region = aws_sdk_athena::config::Region::new(config.region.clone());
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let athena_client = aws_sdk_athena::Client::new(&aws_cfg);

        info!(
            region = %config.region,
            database = %config.database,
            workgroup = %config.workgroup,
            "AthenaClient initialised"
        );

        Ok(Self {
            config,
            athena_client,
        })
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Execute a SQL query and return every result row.
    ///
    /// 1. Start query execution
    /// 2. Poll until completion (with exponential backoff)
    /// 3. Check the scan budget
    /// 4. Fetch all result pages
    pub async fn execute_query(&self, sql: &str) -> Result<AthenaQueryResult, AthenaError> {
        debug!(sql = %sql, "Starting Athena query");

        let start_resp = self
            .athena_client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context({
                let mut ctx = aws_sdk_athena::types::QueryExecutionContext::builder();
                if !self.config.database.is_empty() {
                    ctx = ctx.database(&self.config.database);
                }
                ctx.build()
            })
            .result_configuration(
                aws_sdk_athena::types::ResultConfiguration::builder()
                    .output_location(&self.config.output_location)
                    .build(),
            )
            .work_group(&self.config.workgroup)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let query_id = start_resp
            .query_execution_id()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution ID returned".into()))?
            .to_string();

        info!(query_id = %query_id, "Query execution started");

        let query_execution = self.poll_until_complete(&query_id).await?;
        let metadata = Self::extract_metadata(&query_id, &query_execution);

        // Athena cannot estimate scans up front, so the budget is enforced
        // after the fact and the (already paid for) result is discarded.
        if let Some(limit) = self.config.scan_limit() {
            if metadata.bytes_scanned > limit {
                warn!(
                    bytes_scanned = metadata.bytes_scanned,
                    limit,
                    query_id = %query_id,
                    "Query exceeded scan limit"
                );
                return Err(AthenaError::ScanLimitExceeded {
                    bytes_scanned: metadata.bytes_scanned,
                    limit,
                });
            }
        }

        self.fetch_all_pages(metadata).await
    }

    /// Cancel a running Athena query.
    pub async fn cancel_query(&self, query_id: &str) -> Result<(), AthenaError> {
        info!(query_id = %query_id, "Cancelling query");

        self.athena_client
            .stop_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Poll `GetQueryExecution` with exponential backoff until the query
    /// reaches a terminal state or the configured timeout is exceeded.
    async fn poll_until_complete(
        &self,
        query_id: &str,
    ) -> Result<aws_sdk_athena::types::QueryExecution, AthenaError> {
        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.timeout_seconds as u64);

        let mut delay_ms: u64 = INITIAL_DELAY_MS;

        loop {
            let resp = self
                .athena_client
                .get_query_execution()
                .query_execution_id(query_id)
                .send()
                .await
                .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

            let qe = resp
                .query_execution()
                .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))?
                .clone();

            let state = qe
                .status()
                .and_then(|s| s.state())
                .cloned()
                .unwrap_or(QueryExecutionState::Queued);

            debug!(
                query_id = %query_id,
                state = ?state,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Polling query status"
            );

            match state {
                QueryExecutionState::Succeeded => return Ok(qe),

                QueryExecutionState::Failed => {
                    let reason = qe
                        .status()
                        .and_then(|s| s.state_change_reason())
                        .unwrap_or("unknown")
                        .to_string();

                    error!(query_id = %query_id, reason = %reason, "Query failed");
                    return Err(AthenaError::QueryFailed {
                        query_id: query_id.to_string(),
                        reason,
                    });
                }

                QueryExecutionState::Cancelled => {
                    warn!(query_id = %query_id, "Query was cancelled");
                    return Err(AthenaError::QueryCancelled {
                        query_id: query_id.to_string(),
                    });
                }

                // Queued | Running | unknown future variant
                _ => {}
            }

            if start.elapsed() > timeout {
                warn!(
                    query_id = %query_id,
                    timeout_seconds = self.config.timeout_seconds,
                    "Query timed out, cancelling"
                );
                // Best-effort cancel; the timeout is what gets reported.
                let _ = self.cancel_query(query_id).await;
                return Err(AthenaError::QueryTimeout {
                    query_id: query_id.to_string(),
                    seconds: self.config.timeout_seconds,
                });
            }

            tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms())).await;
            delay_ms = next_delay_ms(delay_ms);
        }
    }

    /// Walk `GetQueryResults` pages until no `next_token` remains.
    async fn fetch_all_pages(&self, metadata: QueryMetadata) -> Result<AthenaQueryResult, AthenaError> {
        let mut columns: Vec<AthenaColumn> = Vec::new();
        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages: u32 = 0;

        loop {
            let output = self
                .athena_client
                .get_query_results()
                .query_execution_id(&metadata.query_id)
                .max_results(MAX_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

            let first_page = pages == 0;
            if first_page {
                columns = parse_columns(&output)?;
            }
            rows.extend(parse_page_rows(&output, first_page)?);
            pages += 1;

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            columns = columns.len(),
            rows = rows.len(),
            pages,
            query_id = %metadata.query_id,
            "Fetched Athena results"
        );

        Ok(AthenaQueryResult {
            columns,
            rows,
            metadata,
            pages,
        })
    }

    /// Extract [`QueryMetadata`] from an SDK `QueryExecution`.
    fn extract_metadata(
        query_id: &str,
        qe: &aws_sdk_athena::types::QueryExecution,
    ) -> QueryMetadata {
        let stats = qe.statistics();
        let status = qe.status();

        QueryMetadata {
            query_id: query_id.to_string(),
            bytes_scanned: stats
                .and_then(|s| s.data_scanned_in_bytes())
                .unwrap_or(0) as u64,
            execution_time_ms: stats
                .and_then(|s| s.engine_execution_time_in_millis())
                .unwrap_or(0) as u64,
            state: status
                .and_then(|s| s.state())
                .map(|s| format!("{:?}", s))
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            output_location: qe
                .result_configuration()
                .and_then(|rc| rc.output_location())
                .map(|s| s.to_string()),
        }
    }
}

#[async_trait]
impl RowSource for AthenaClient {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<FlatRow>, RowSourceError> {
        let result = self.execute_query(sql).await?;
        info!(
            query_id = %result.metadata.query_id,
            rows = result.row_count(),
            pages = result.pages,
            bytes_scanned = result.metadata.bytes_scanned,
            execution_time_ms = result.metadata.execution_time_ms,
            cost_usd = result.cost_estimate_usd(),
            "Athena query complete"
        );
        Ok(result_to_rows(&result))
    }

    fn name(&self) -> &str {
        "athena"
    }
}

// ---------------------------------------------------------------------------
// Backoff + parsing helpers
// ---------------------------------------------------------------------------

const INITIAL_DELAY_MS: u64 = 200;
const MAX_DELAY_MS: u64 = 2000;
const BACKOFF_FACTOR: f64 = 1.5;

fn next_delay_ms(current: u64) -> u64 {
    ((current as f64 * BACKOFF_FACTOR) as u64).min(MAX_DELAY_MS)
}

/// Jitter in [0, 100) ms without pulling in rand: nanosecond fraction of now.
fn jitter_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64
        % 100
}

fn parse_columns(output: &GetQueryResultsOutput) -> Result<Vec<AthenaColumn>, AthenaError> {
    let result_set = output
        .result_set()
        .ok_or_else(|| AthenaError::ParseError("No ResultSet in response".into()))?;

    Ok(result_set
        .result_set_metadata()
        .map(|meta| {
            meta.column_info()
                .iter()
                .map(|ci| AthenaColumn {
                    name: ci.name().to_string(),
                    data_type: ci.r#type().to_string(),
                })
                .collect()
        })
        .unwrap_or_default())
}

/// On the first page of a SELECT (no `UpdateCount`), row 0 echoes the
/// column headers and is skipped.
fn parse_page_rows(
    output: &GetQueryResultsOutput,
    first_page: bool,
) -> Result<Vec<Vec<Option<String>>>, AthenaError> {
    let result_set = output
        .result_set()
        .ok_or_else(|| AthenaError::ParseError("No ResultSet in response".into()))?;

    let raw_rows = result_set.rows();
    let skip = usize::from(first_page && output.update_count().is_none() && !raw_rows.is_empty());

    Ok(raw_rows
        .iter()
        .skip(skip)
        .map(|row| {
            row.data()
                .iter()
                .map(|datum| datum.var_char_value().map(|v| v.to_string()))
                .collect()
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests: parsing and backoff only, no AWS calls
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_athena::types::{ColumnInfo, Datum, ResultSet, ResultSetMetadata, Row};

    fn datum(v: Option<&str>) -> Datum {
        let b = Datum::builder();
        match v {
            Some(s) => b.var_char_value(s).build(),
            None => b.build(),
        }
    }

    fn page(rows: &[&[Option<&str>]], next_token: Option<&str>) -> GetQueryResultsOutput {
        let meta = ResultSetMetadata::builder()
            .column_info(ColumnInfo::builder().name("company_no").r#type("bigint").build().unwrap())
            .column_info(ColumnInfo::builder().name("company_name").r#type("varchar").build().unwrap())
            .build();
        let mut rs = ResultSet::builder().result_set_metadata(meta);
        for r in rows {
            let mut row = Row::builder();
            for cell in r.iter() {
                row = row.data(datum(*cell));
            }
            rs = rs.rows(row.build());
        }
        let mut out = GetQueryResultsOutput::builder().result_set(rs.build());
        if let Some(t) = next_token {
            out = out.next_token(t);
        }
        out.build()
    }

    #[test]
    fn first_page_skips_header_echo() {
        let out = page(
            &[
                &[Some("company_no"), Some("company_name")],
                &[Some("1"), Some("acme")],
                &[Some("2"), None],
            ],
            None,
        );
        let rows = parse_page_rows(&out, true).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1].as_deref(), Some("acme"));
        assert_eq!(rows[1][1], None);
    }

    #[test]
    fn later_pages_keep_every_row() {
        let out = page(&[&[Some("3"), Some("beta")]], Some("tok"));
        let rows = parse_page_rows(&out, false).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(out.next_token(), Some("tok"));
    }

    #[test]
    fn columns_come_from_metadata() {
        let out = page(&[], None);
        let cols = parse_columns(&out).unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].name, "company_no");
        assert_eq!(cols[0].data_type, "bigint");
    }

    #[test]
    fn missing_result_set_is_a_parse_error() {
        let out = GetQueryResultsOutput::builder().build();
        assert!(matches!(parse_columns(&out), Err(AthenaError::ParseError(_))));
        assert!(matches!(parse_page_rows(&out, true), Err(AthenaError::ParseError(_))));
    }

    #[test]
    fn backoff_grows_and_caps() {
        assert_eq!(next_delay_ms(INITIAL_DELAY_MS), 300);
        assert_eq!(next_delay_ms(1500), MAX_DELAY_MS);
        assert_eq!(next_delay_ms(MAX_DELAY_MS), MAX_DELAY_MS);
    }

    #[test]
    fn jitter_is_bounded() {
        for _ in 0..1000 {
            assert!(jitter_ms() < 100);
        }
    }

    #[test]
    fn error_display_messages() {
        assert_eq!(AthenaError::NotEnabled.to_string(), "Athena is not enabled in config");

        let err = AthenaError::QueryFailed {
            query_id: "abc-123".into(),
            reason: "syntax error".into(),
        };
        assert!(err.to_string().contains("abc-123"));
        assert!(err.to_string().contains("syntax error"));

        let err = AthenaError::QueryTimeout { query_id: "t-1".into(), seconds: 60 };
        assert!(err.to_string().contains("60s"));

        let err = AthenaError::ScanLimitExceeded { bytes_scanned: 1_000_000, limit: 500_000 };
        assert!(err.to_string().contains("1000000"));
        assert!(err.to_string().contains("500000"));
    }
}
