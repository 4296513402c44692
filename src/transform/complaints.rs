//! Complaint transformer: raw 311 extract -> fact table + time dimension.
//!
//! The raw file is far larger than comfortable in-memory size, so it is read
//! in fixed-size batches with only the 17 retained columns materialized,
//! concatenated into one logical table. Timestamps are parsed strictly; a
//! single malformed value fails the whole run.

use crate::config::EtlConfig;
use crate::constants::{
    COMPLAINT_SOURCE_COLUMNS, COMPLAINT_TIMESTAMP_FORMAT, DIM_TIME_COLUMNS, DIM_TIME_KEY,
    FACT_COMPLAINTS_COLUMNS, FACT_COMPLAINTS_KEY,
};
use crate::error::{EtlError, Result};
use crate::mappers::{self, COMMUNITY_DISTRICTS};
use crate::models::TransformStats;
use crate::store::FsStore;
use crate::transform::{normalize_column_names, serialize_csv};

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use sysinfo::System;
use tracing::{debug, info, warn};

/// Memory usage ratio above which batch ingestion logs a pressure warning
const MEMORY_PRESSURE_THRESHOLD: f64 = 0.8;

/// Transformer producing `fact_complaints` and `dim_time`
#[derive(Debug)]
pub struct ComplaintTransformer {
    store: FsStore,
    config: EtlConfig,
}

impl ComplaintTransformer {
    pub fn new(store: FsStore, config: EtlConfig) -> Self {
        Self { store, config }
    }

    /// Run the transform: read, reshape, write both outputs.
    ///
    /// Either both destination keys are written or the run fails; the two
    /// puts are not transactional as a pair, so a failed run must be
    /// retried wholesale.
    pub async fn run(&self) -> Result<TransformStats> {
        let start = Instant::now();
        let key = &self.config.complaints_key;
        let path = self.store.local_path(key);
        if !path.is_file() {
            return Err(EtlError::source_missing(key.clone()));
        }

        info!("Transforming complaint data from {}", key);
        let mut raw = self.read_batched(&path)?;
        let rows_in = raw.height();
        if rows_in == 0 {
            warn!("Complaint source {} contains zero records", key);
        }

        normalize_column_names(&mut raw)?;
        self.log_unmatched_districts(&raw)?;

        let mut fact = build_fact(raw)?;
        let mut time_dim = build_time_dimension(&fact)?;

        let rows_out = fact.height() + time_dim.height();
        self.store
            .put(FACT_COMPLAINTS_KEY, &serialize_csv(&mut fact)?)
            .await?;
        self.store
            .put(DIM_TIME_KEY, &serialize_csv(&mut time_dim)?)
            .await?;

        info!(
            "Complaint transform complete: {} facts, {} distinct timestamps",
            fact.height(),
            time_dim.height()
        );

        Ok(TransformStats {
            rows_in,
            rows_out,
            outputs: vec![FACT_COMPLAINTS_KEY.to_string(), DIM_TIME_KEY.to_string()],
            empty_input: rows_in == 0,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }

    /// Single pass over the raw file in bounded batches, keeping only the
    /// retained columns, concatenating the batches into one table.
    fn read_batched(&self, path: &Path) -> Result<DataFrame> {
        let schema = source_schema();
        let projection: Arc<[PlSmallStr]> = COMPLAINT_SOURCE_COLUMNS
            .iter()
            .map(|c| PlSmallStr::from_static(c))
            .collect();

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );

        let mut reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_columns(Some(projection))
            .with_schema_overwrite(Some(schema.clone()))
            .with_chunk_size(self.config.chunk_size)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?;
        let mut batched = reader.batched_borrowed()?;

        let mut system = System::new();
        let mut combined: Option<DataFrame> = None;
        let mut rows = 0usize;

        while let Some(batches) = batched.next_batches(1)? {
            for batch in batches {
                rows += batch.height();
                match combined.as_mut() {
                    Some(df) => {
                        df.vstack_mut(&batch)?;
                    }
                    None => combined = Some(batch),
                }
            }
            pb.set_message(format!("Read {} complaint records", rows));

            if memory_pressure(&mut system) {
                warn!(
                    "Memory pressure above {:.0}% after {} rows, continuing single-batch",
                    MEMORY_PRESSURE_THRESHOLD * 100.0,
                    rows
                );
            }
        }

        pb.finish_with_message(format!("Read {} complaint records", rows));
        debug!("Concatenated {} rows from {}", rows, path.display());

        // A header-only file yields no batches
        let df = match combined {
            Some(df) => df,
            None => DataFrame::empty_with_schema(schema.as_ref()),
        };
        Ok(df.select(COMPLAINT_SOURCE_COLUMNS.iter().copied())?)
    }

    /// Count community-board labels that will pass through unreplaced.
    /// Pass-through is the defined behavior, but silent garbage in a
    /// normalized column is worth a warning per run.
    fn log_unmatched_districts(&self, df: &DataFrame) -> Result<()> {
        let known: HashSet<&str> = COMMUNITY_DISTRICTS.iter().map(|(l, _)| *l).collect();
        let unmatched = df
            .column("community_board")?
            .str()?
            .iter()
            .filter(|v| matches!(v, Some(label) if !known.contains(label)))
            .count();

        if unmatched > 0 {
            warn!(
                "{} community-board values have no district mapping and pass through unchanged",
                unmatched
            );
        }
        Ok(())
    }
}

/// Columns and types forced at read time. Everything not numeric stays a
/// string so that batch-local inference can never produce diverging types.
fn source_schema() -> SchemaRef {
    let mut schema = Schema::with_capacity(COMPLAINT_SOURCE_COLUMNS.len());
    for column in COMPLAINT_SOURCE_COLUMNS {
        let dtype = match *column {
            "Unique Key" => DataType::Int64,
            "Latitude" | "Longitude" => DataType::Float64,
            _ => DataType::String,
        };
        schema.with_column(PlSmallStr::from_static(column), dtype);
    }
    Arc::new(schema)
}

/// Parse the creation timestamp, derive the incident date, normalize
/// community-district codes and put the primary key first.
fn build_fact(raw: DataFrame) -> Result<DataFrame> {
    let (labels, codes) = mappers::district_replace_series();

    let fact = raw
        .lazy()
        .with_columns([col("created_date").str().to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            StrptimeOptions {
                format: Some(COMPLAINT_TIMESTAMP_FORMAT.into()),
                strict: true,
                ..Default::default()
            },
            lit("raise"),
        )])
        .with_columns([
            col("created_date").cast(DataType::Date).alias("incident_date"),
            col("community_board").replace(lit(labels), lit(codes)),
        ])
        .select(
            FACT_COMPLAINTS_COLUMNS
                .iter()
                .map(|c| col(*c))
                .collect::<Vec<_>>(),
        )
        .collect()?;

    Ok(fact)
}

/// One row per distinct creation timestamp (first occurrence kept), with
/// the calendar components derived from it. Weekday follows the Monday=0
/// convention of the downstream consumers.
fn build_time_dimension(fact: &DataFrame) -> Result<DataFrame> {
    let timestamps = fact
        .column("created_date")?
        .as_materialized_series()
        .unique_stable()?;

    let time_dim = DataFrame::new(vec![timestamps.into_column()])?
        .lazy()
        .with_columns([
            col("created_date").dt().year().alias("year"),
            col("created_date").dt().month().alias("month"),
            col("created_date").dt().day().alias("day"),
            col("created_date").dt().hour().alias("hour"),
            col("created_date").dt().minute().alias("minute"),
            (col("created_date").dt().weekday() - lit(1)).alias("weekday"),
            col("created_date").dt().quarter().alias("quarter"),
            col("created_date").dt().ordinal_day().alias("day_of_year"),
        ])
        .select(DIM_TIME_COLUMNS.iter().map(|c| col(*c)).collect::<Vec<_>>())
        .collect()?;

    Ok(time_dim)
}

fn memory_pressure(system: &mut System) -> bool {
    system.refresh_memory();
    let total = system.total_memory() as f64;
    if total == 0.0 {
        return false;
    }
    system.used_memory() as f64 / total > MEMORY_PRESSURE_THRESHOLD
}
