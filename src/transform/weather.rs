//! Weather transformer: NOAA observation blobs -> wide weather dimension.
//!
//! Raw observations arrive as many small JSON arrays partitioned by
//! (datatype, year). They are loaded with bounded concurrency, concatenated
//! long-form, then pivoted so each record date carries one column per
//! weather variable. Dates missing some variables keep their row with null
//! cells.

use crate::config::EtlConfig;
use crate::constants::{
    DIM_WEATHER_KEY, WEATHER_DATE_FORMAT, WEATHER_LOAD_CONCURRENCY, WEATHER_VARIABLE_NAMES,
};
use crate::error::{EtlError, Result};
use crate::models::TransformStats;
use crate::store::FsStore;
use crate::transform::serialize_csv;

use futures::stream::{self, StreamExt, TryStreamExt};
use polars::functions::concat_df_diagonal;
use polars::prelude::pivot::pivot_stable;
use polars::prelude::*;
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Transformer producing `dim_weather`
#[derive(Debug)]
pub struct WeatherTransformer {
    store: FsStore,
    config: EtlConfig,
}

impl WeatherTransformer {
    pub fn new(store: FsStore, config: EtlConfig) -> Self {
        Self { store, config }
    }

    pub async fn run(&self) -> Result<TransformStats> {
        let start = Instant::now();
        let prefix = &self.config.weather_prefix;

        let keys = self.store.list(prefix).await?;
        if keys.is_empty() {
            // Vacuous output is written so downstream loads do not break on
            // a missing key, but the anomaly must not pass silently.
            warn!(
                "No weather blobs found under '{}'; writing an empty dimension",
                prefix
            );
            let mut empty = df!("record_date" => Vec::<String>::new())?;
            self.store
                .put(DIM_WEATHER_KEY, &serialize_csv(&mut empty)?)
                .await?;
            return Ok(TransformStats {
                rows_in: 0,
                rows_out: 0,
                outputs: vec![DIM_WEATHER_KEY.to_string()],
                empty_input: true,
                elapsed_ms: start.elapsed().as_millis(),
            });
        }

        info!("Loading {} weather blobs under '{}'", keys.len(), prefix);
        let frames = self.load_blobs(&keys).await?;
        let long = concat_df_diagonal(&frames)?;
        let rows_in = long.height();
        debug!("Concatenated {} raw observations", rows_in);

        let mut wide = pivot_wide(long)?;
        let rows_out = wide.height();

        self.store
            .put(DIM_WEATHER_KEY, &serialize_csv(&mut wide)?)
            .await?;

        info!(
            "Weather transform complete: {} observations over {} record dates",
            rows_in, rows_out
        );

        Ok(TransformStats {
            rows_in,
            rows_out,
            outputs: vec![DIM_WEATHER_KEY.to_string()],
            empty_input: false,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }

    /// Fetch and parse every blob, a few at a time, preserving key order so
    /// reruns concatenate identically.
    async fn load_blobs(&self, keys: &[String]) -> Result<Vec<DataFrame>> {
        stream::iter(keys.iter().cloned())
            .map(|key| {
                let store = self.store.clone();
                async move {
                    let bytes = store.get(&key).await?;
                    let df = JsonReader::new(Cursor::new(bytes)).finish()?;
                    // Blob-local inference types an all-integral `value`
                    // column as Int64; unify before the concat.
                    let df = df
                        .lazy()
                        .with_columns([col("value").cast(DataType::Float64)])
                        .collect()?;
                    debug!("Loaded {} observations from {}", df.height(), key);
                    Ok::<DataFrame, EtlError>(df)
                }
            })
            .buffered(WEATHER_LOAD_CONCURRENCY)
            .try_collect()
            .await
    }
}

/// Long form (date, datatype, value) to wide form (record_date + one column
/// per variable). Station and attribute columns are discarded; duplicate
/// (date, datatype) pairs are a fatal format error.
fn pivot_wide(long: DataFrame) -> Result<DataFrame> {
    let long = long
        .lazy()
        .select([
            col("date")
                .str()
                .to_date(StrptimeOptions {
                    format: Some(WEATHER_DATE_FORMAT.into()),
                    strict: true,
                    ..Default::default()
                })
                .alias("record_date"),
            col("datatype"),
            col("value"),
        ])
        .collect()?;

    let mut wide = pivot_stable(
        &long,
        ["datatype"],
        Some(["record_date"]),
        Some(["value"]),
        true,
        None,
        None,
    )?;

    for (code, name) in WEATHER_VARIABLE_NAMES.iter().copied() {
        if wide.get_column_index(code).is_some() {
            wide.rename(code, name.into())?;
        }
    }

    Ok(wide.sort(["record_date"], SortMultipleOptions::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn observation(date: &str, datatype: &str, value: f64) -> String {
        format!(
            r#"{{"date": "{date}", "datatype": "{datatype}", "station": "GHCND:USW00094728", "attributes": ",,W,2400", "value": {value}}}"#
        )
    }

    fn blob(observations: &[String]) -> Vec<u8> {
        format!("[{}]", observations.join(",")).into_bytes()
    }

    async fn fixture() -> (TempDir, FsStore, EtlConfig) {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());
        let config = EtlConfig {
            data_root: temp_dir.path().to_path_buf(),
            ..EtlConfig::default()
        };
        (temp_dir, store, config)
    }

    #[tokio::test]
    async fn test_pivot_keeps_partially_observed_dates() {
        let (_guard, store, config) = fixture().await;
        store
            .put(
                "weather/TMAX_2016.json",
                &blob(&[observation("2016/01/01", "TMAX", 40.0)]),
            )
            .await
            .unwrap();
        store
            .put(
                "weather/TMIN_2016.json",
                &blob(&[observation("2016/01/01", "TMIN", 20.0)]),
            )
            .await
            .unwrap();
        store
            .put(
                "weather/PRCP_2016.json",
                &blob(&[observation("2016/01/02", "PRCP", 0.3)]),
            )
            .await
            .unwrap();

        let stats = WeatherTransformer::new(store.clone(), config)
            .run()
            .await
            .unwrap();
        assert_eq!(stats.rows_in, 3);
        assert_eq!(stats.rows_out, 2);
        assert!(!stats.empty_input);

        let out = String::from_utf8(store.get(DIM_WEATHER_KEY).await.unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        // Pivoted columns come out in sorted datatype order, then renamed
        assert_eq!(lines[0], "record_date,precipitation,max_temp,min_temp");
        // The date with only TMAX/TMIN keeps its row; precipitation is null
        assert_eq!(lines[1], "2016-01-01,,40.0,20.0");
        assert_eq!(lines[2], "2016-01-02,0.3,,");
    }

    #[tokio::test]
    async fn test_whole_number_blob_concats_with_fractional() {
        // Whole-degree readings serialize without a decimal point, so the
        // blob's value column arrives integral while precipitation arrives
        // fractional; both must land in the same dimension.
        let (_guard, store, config) = fixture().await;
        store
            .put(
                "weather/TMAX_2016.json",
                &blob(&[
                    observation("2016/01/01", "TMAX", 38.0),
                    observation("2016/01/02", "TMAX", 40.0),
                ]),
            )
            .await
            .unwrap();
        store
            .put(
                "weather/PRCP_2016.json",
                &blob(&[observation("2016/01/01", "PRCP", 0.3)]),
            )
            .await
            .unwrap();

        let stats = WeatherTransformer::new(store.clone(), config)
            .run()
            .await
            .unwrap();
        assert_eq!(stats.rows_in, 3);
        assert_eq!(stats.rows_out, 2);

        let out = String::from_utf8(store.get(DIM_WEATHER_KEY).await.unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "record_date,precipitation,max_temp");
        assert_eq!(lines[1], "2016-01-01,0.3,38.0");
        assert_eq!(lines[2], "2016-01-02,,40.0");
    }

    #[tokio::test]
    async fn test_all_five_variables_rename() {
        let (_guard, store, config) = fixture().await;
        let observations: Vec<String> = WEATHER_VARIABLE_NAMES
            .iter()
            .enumerate()
            .map(|(i, &(code, _))| observation("2016/01/01", code, i as f64))
            .collect();
        store
            .put("weather/all_2016.json", &blob(&observations))
            .await
            .unwrap();

        WeatherTransformer::new(store.clone(), config)
            .run()
            .await
            .unwrap();

        let out = String::from_utf8(store.get(DIM_WEATHER_KEY).await.unwrap()).unwrap();
        assert_eq!(
            out.lines().next().unwrap(),
            "record_date,precipitation,snowfall,snow_depth,max_temp,min_temp"
        );
    }

    #[tokio::test]
    async fn test_empty_prefix_writes_vacuous_output() {
        let (_guard, store, config) = fixture().await;

        let stats = WeatherTransformer::new(store.clone(), config)
            .run()
            .await
            .unwrap();
        assert!(stats.empty_input);
        assert_eq!(stats.rows_out, 0);

        let out = String::from_utf8(store.get(DIM_WEATHER_KEY).await.unwrap()).unwrap();
        assert_eq!(out.trim(), "record_date");
    }

    #[tokio::test]
    async fn test_duplicate_observation_is_fatal() {
        let (_guard, store, config) = fixture().await;
        store
            .put(
                "weather/TMAX_2016.json",
                &blob(&[
                    observation("2016/01/01", "TMAX", 40.0),
                    observation("2016/01/01", "TMAX", 41.0),
                ]),
            )
            .await
            .unwrap();

        let result = WeatherTransformer::new(store, config).run().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_date_is_fatal() {
        let (_guard, store, config) = fixture().await;
        store
            .put(
                "weather/TMAX_2016.json",
                &blob(&[observation("01-01-2016", "TMAX", 40.0)]),
            )
            .await
            .unwrap();

        let result = WeatherTransformer::new(store, config).run().await;
        assert!(result.is_err());
    }
}
