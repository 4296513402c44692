//! Demographics transformer: indicator spreadsheet -> demographics dimension.
//!
//! Loads the `Data` worksheet, keeps the region/year keys plus ten
//! indicators, filters to valid community-district codes and the fixed year
//! range, and joins each surviving region code to its neighborhood name.
//! A surviving code with no name is a referential-integrity violation and
//! fails the run; it is never guessed or silently dropped.

use crate::config::EtlConfig;
use crate::constants::{
    DEMOGRAPHICS_SHEET, DEMOGRAPHICS_SOURCE_COLUMNS, DEMOGRAPHICS_YEAR_MAX, DEMOGRAPHICS_YEAR_MIN,
    DIM_DEMOGRAPHICS_COLUMNS, DIM_DEMOGRAPHICS_KEY, REGION_CODE_MAX, REGION_CODE_MIN,
};
use crate::error::{EtlError, Result};
use crate::mappers;
use crate::models::TransformStats;
use crate::store::FsStore;
use crate::transform::{normalize_column_names, serialize_csv};

use calamine::{Data, Reader, Xlsx};
use polars::prelude::*;
use std::io::Cursor;
use std::time::Instant;
use tracing::{info, warn};

/// Transformer producing `dim_demographics`
#[derive(Debug)]
pub struct DemographicsTransformer {
    store: FsStore,
    config: EtlConfig,
}

impl DemographicsTransformer {
    pub fn new(store: FsStore, config: EtlConfig) -> Self {
        Self { store, config }
    }

    pub async fn run(&self) -> Result<TransformStats> {
        let start = Instant::now();
        let key = &self.config.demographics_key;

        info!("Transforming demographics data from {}", key);
        let bytes = self.store.get(key).await?;
        let raw = load_worksheet(&bytes, key)?;
        let rows_in = raw.height();
        if rows_in == 0 {
            warn!("Demographics worksheet {} contains zero data rows", key);
        }

        let mut dim = shape_dimension(raw)?;
        let rows_out = dim.height();

        self.store
            .put(DIM_DEMOGRAPHICS_KEY, &serialize_csv(&mut dim)?)
            .await?;

        info!(
            "Demographics transform complete: {} of {} rows retained",
            rows_out, rows_in
        );

        Ok(TransformStats {
            rows_in,
            rows_out,
            outputs: vec![DIM_DEMOGRAPHICS_KEY.to_string()],
            empty_input: rows_in == 0,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}

/// Parse the named worksheet out of the XLSX bytes and build a frame from
/// the retained columns.
fn load_worksheet(bytes: &[u8], key: &str) -> Result<DataFrame> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| EtlError::spreadsheet_format(key, e.to_string()))?;
    let range = workbook
        .worksheet_range(DEMOGRAPHICS_SHEET)
        .map_err(|e| {
            EtlError::spreadsheet_format(
                key,
                format!("worksheet '{}' not readable: {}", DEMOGRAPHICS_SHEET, e),
            )
        })?;

    frame_from_rows(range.rows(), key)
}

/// Build a typed frame from spreadsheet rows. The first row is the header;
/// the retained columns are located by exact header match.
fn frame_from_rows<'a>(
    mut rows: impl Iterator<Item = &'a [Data]>,
    key: &str,
) -> Result<DataFrame> {
    let header = rows
        .next()
        .ok_or_else(|| EtlError::spreadsheet_format(key, "worksheet is empty"))?;
    let header: Vec<String> = header.iter().map(cell_to_string).collect();

    let mut indices = Vec::with_capacity(DEMOGRAPHICS_SOURCE_COLUMNS.len());
    for column in DEMOGRAPHICS_SOURCE_COLUMNS {
        let index = header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| EtlError::missing_column(*column, key))?;
        indices.push(index);
    }

    let mut cells: Vec<Vec<Option<f64>>> =
        vec![Vec::new(); DEMOGRAPHICS_SOURCE_COLUMNS.len()];
    for row in rows {
        for (slot, &index) in indices.iter().enumerate() {
            cells[slot].push(row.get(index).and_then(cell_to_f64));
        }
    }

    let mut columns = Vec::with_capacity(DEMOGRAPHICS_SOURCE_COLUMNS.len());
    for (column, values) in DEMOGRAPHICS_SOURCE_COLUMNS.iter().zip(cells) {
        let series = match *column {
            // Keys are integral codes
            "Region ID" | "Year" => Series::new(
                (*column).into(),
                values
                    .iter()
                    .map(|v| v.map(|f| f as i64))
                    .collect::<Vec<Option<i64>>>(),
            ),
            _ => Series::new((*column).into(), values),
        };
        columns.push(series.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Filter to valid region codes and years, require a population count, and
/// join each region to its neighborhood name.
fn shape_dimension(raw: DataFrame) -> Result<DataFrame> {
    let mut filtered = raw
        .lazy()
        .filter(
            col("Region ID")
                .gt_eq(lit(REGION_CODE_MIN))
                .and(col("Region ID").lt_eq(lit(REGION_CODE_MAX)))
                .and(col("Year").gt_eq(lit(DEMOGRAPHICS_YEAR_MIN)))
                .and(col("Year").lt_eq(lit(DEMOGRAPHICS_YEAR_MAX)))
                .and(col("pop_num").is_not_null()),
        )
        .with_columns([col("pop_num").cast(DataType::Int64)])
        .collect()?;

    normalize_column_names(&mut filtered)?;

    let names = mappers::neighborhood_frame()?;
    let joined = filtered
        .lazy()
        .join(
            names.lazy(),
            [col("region_id")],
            [col("region_id")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    // A code inside the valid range but absent from the lookup means the
    // reference table and the source disagree about the district map.
    let unnamed = joined.column("region_name")?.is_null();
    if unnamed.sum().unwrap_or(0) > 0 {
        let offenders = joined.filter(&unnamed)?;
        let codes: Vec<i64> = offenders
            .column("region_id")?
            .as_materialized_series()
            .i64()?
            .iter()
            .flatten()
            .collect();
        return Err(EtlError::ReferentialIntegrity { codes });
    }

    Ok(joined.select(DIM_DEMOGRAPHICS_COLUMNS.iter().copied())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(region: i64, year: i64, pop: Option<f64>) -> DataFrame {
        df!(
            "Region ID" => &[Some(region)],
            "Year" => &[Some(year)],
            "pop_num" => &[pop],
            "pop_pov_65p_pct" => &[Some(0.2)],
            "pop_pov_pct" => &[Some(0.15)],
            "pop_race_asian_pct" => &[Some(0.3)],
            "pop_race_black_pct" => &[Some(0.1)],
            "pop_race_div_idx" => &[Some(0.7)],
            "pop_race_hisp_pct" => &[Some(0.25)],
            "pop_race_white_pct" => &[Some(0.35)],
            "pop16_unemp_pct" => &[Some(0.05)],
        )
        .unwrap()
    }

    fn raw_rows(rows: &[DataFrame]) -> DataFrame {
        let mut combined = rows[0].clone();
        for row in &rows[1..] {
            combined.vstack_mut(row).unwrap();
        }
        combined
    }

    #[test]
    fn test_boundary_filters() {
        let raw = raw_rows(&[
            raw_row(504, 2017, Some(1000.0)), // region out of range
            raw_row(305, 2019, Some(1000.0)), // year out of range
            raw_row(305, 2017, None),         // missing population
            raw_row(305, 2017, Some(50000.0)),
        ]);

        let dim = shape_dimension(raw).unwrap();
        assert_eq!(dim.height(), 1);

        let region = dim.column("region_id").unwrap().get(0).unwrap();
        assert_eq!(region, AnyValue::Int64(305));
        let name = dim.column("region_name").unwrap().get(0).unwrap();
        assert_eq!(name, AnyValue::String("Midtown"));
        // Population is an integer after the cast
        let pop = dim.column("pop_num").unwrap().get(0).unwrap();
        assert_eq!(pop, AnyValue::Int64(50000));
    }

    #[test]
    fn test_composite_key_columns_lead_output() {
        let raw = raw_rows(&[
            raw_row(101, 2014, Some(90000.0)),
            raw_row(101, 2015, Some(91000.0)),
        ]);
        let dim = shape_dimension(raw).unwrap();

        let names: Vec<String> = dim
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, DIM_DEMOGRAPHICS_COLUMNS);
        assert_eq!(dim.height(), 2);
    }

    #[test]
    fn test_in_range_code_without_name_is_fatal() {
        // 115 sits inside 101..=503 but is not a real Bronx district
        let raw = raw_row(115, 2016, Some(1234.0));
        let err = shape_dimension(raw).unwrap_err();
        match err {
            EtlError::ReferentialIntegrity { codes } => assert_eq!(codes, vec![115]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_frame_from_rows_types_and_headers() {
        let mut header: Vec<Data> = DEMOGRAPHICS_SOURCE_COLUMNS
            .iter()
            .map(|c| Data::String(c.to_string()))
            .collect();
        // Extra unrelated column is ignored
        header.push(Data::String("pop_other".into()));

        let mut data_row = vec![
            Data::Float(305.0),
            Data::Int(2017),
            Data::Float(50000.0),
        ];
        data_row.extend(std::iter::repeat_n(Data::Float(0.5), 8));
        data_row.push(Data::String("ignored".into()));

        let rows = vec![header, data_row];
        let df = frame_from_rows(rows.iter().map(|r| r.as_slice()), "test.xlsx").unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), DEMOGRAPHICS_SOURCE_COLUMNS.len());
        assert_eq!(
            df.column("Region ID").unwrap().get(0).unwrap(),
            AnyValue::Int64(305)
        );
        assert_eq!(
            df.column("Year").unwrap().get(0).unwrap(),
            AnyValue::Int64(2017)
        );
    }

    #[test]
    fn test_frame_from_rows_missing_column() {
        let header = vec![
            Data::String("Region ID".into()),
            Data::String("Year".into()),
        ];
        let rows = vec![header];
        let err = frame_from_rows(rows.iter().map(|r| r.as_slice()), "test.xlsx").unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { .. }));
    }

    #[test]
    fn test_empty_worksheet_is_fatal() {
        let rows: Vec<Vec<Data>> = Vec::new();
        let err = frame_from_rows(rows.iter().map(|r| r.as_slice()), "test.xlsx").unwrap_err();
        assert!(matches!(err, EtlError::SpreadsheetFormat { .. }));
    }
}
