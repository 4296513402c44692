//! Fixed keys, retained columns and declared output schemas.
//!
//! Output field names are declared here explicitly rather than derived at
//! runtime from the rename rule, so the transformer and the warehouse loader
//! cannot drift apart silently.

// =============================================================================
// Object store keys
// =============================================================================

/// Default raw complaint extract (single large delimited file)
pub const RAW_COMPLAINTS_KEY: &str =
    "311_complaints/311_Service_Requests_from_2010_to_Present.csv";

/// Prefix holding one JSON blob per (datatype, year) weather extraction
pub const RAW_WEATHER_PREFIX: &str = "weather/";

/// Default raw demographics spreadsheet
pub const RAW_DEMOGRAPHICS_KEY: &str =
    "demographics/Neighorhood_Indicators_CoreDataDownload_2020-06-30.xlsx";

/// Worksheet holding the demographics indicators
pub const DEMOGRAPHICS_SHEET: &str = "Data";

pub const FACT_COMPLAINTS_KEY: &str = "processed/fact_complaints/fact_complaints.csv";
pub const DIM_TIME_KEY: &str = "processed/dim_time/dim_time.csv";
pub const DIM_WEATHER_KEY: &str = "processed/dim_weather/dim_weather.csv";
pub const DIM_DEMOGRAPHICS_KEY: &str = "processed/dim_demographics/dim_demographics.csv";

// =============================================================================
// Source columns
// =============================================================================

/// Columns retained from the raw complaint file; everything else is dropped
/// at read time to bound memory.
pub const COMPLAINT_SOURCE_COLUMNS: &[&str] = &[
    "Unique Key",
    "Created Date",
    "Agency",
    "Agency Name",
    "Complaint Type",
    "Descriptor",
    "Location Type",
    "Incident Zip",
    "Incident Address",
    "Street Name",
    "City",
    "Status",
    "Community Board",
    "Borough",
    "Latitude",
    "Longitude",
    "Location",
];

/// Indicator columns retained from the demographics worksheet, in sheet order
pub const DEMOGRAPHICS_SOURCE_COLUMNS: &[&str] = &[
    "Region ID",
    "Year",
    "pop_num",
    "pop_pov_65p_pct",
    "pop_pov_pct",
    "pop_race_asian_pct",
    "pop_race_black_pct",
    "pop_race_div_idx",
    "pop_race_hisp_pct",
    "pop_race_white_pct",
    "pop16_unemp_pct",
];

// =============================================================================
// Declared output schemas (leading field is the table key)
// =============================================================================

pub const FACT_COMPLAINTS_COLUMNS: &[&str] = &[
    "unique_key",
    "created_date",
    "agency",
    "agency_name",
    "complaint_type",
    "descriptor",
    "location_type",
    "incident_zip",
    "incident_address",
    "street_name",
    "city",
    "status",
    "community_board",
    "borough",
    "latitude",
    "longitude",
    "location",
    "incident_date",
];

pub const DIM_TIME_COLUMNS: &[&str] = &[
    "created_date",
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "weekday",
    "quarter",
    "day_of_year",
];

pub const DIM_DEMOGRAPHICS_COLUMNS: &[&str] = &[
    "region_id",
    "year",
    "pop_num",
    "pop_pov_65p_pct",
    "pop_pov_pct",
    "pop_race_asian_pct",
    "pop_race_black_pct",
    "pop_race_div_idx",
    "pop_race_hisp_pct",
    "pop_race_white_pct",
    "pop16_unemp_pct",
    "region_name",
];

/// NOAA datatype codes mapped to the descriptive weather dimension columns
pub const WEATHER_VARIABLE_NAMES: &[(&str, &str)] = &[
    ("PRCP", "precipitation"),
    ("SNOW", "snowfall"),
    ("SNWD", "snow_depth"),
    ("TMAX", "max_temp"),
    ("TMIN", "min_temp"),
];

// =============================================================================
// Formats and processing defaults
// =============================================================================

/// Strict format of the raw complaint creation timestamp
pub const COMPLAINT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Strict format of the raw weather observation date
pub const WEATHER_DATE_FORMAT: &str = "%Y/%m/%d";

/// Datetime rendering in CSV outputs
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date rendering in CSV outputs
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Rows per batch when reading the complaint file
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Valid community-district region codes (inclusive, with gaps)
pub const REGION_CODE_MIN: i64 = 101;
pub const REGION_CODE_MAX: i64 = 503;

/// Year range retained in the demographics dimension (inclusive)
pub const DEMOGRAPHICS_YEAR_MIN: i64 = 2014;
pub const DEMOGRAPHICS_YEAR_MAX: i64 = 2018;

/// Maximum number of weather blobs loaded concurrently
pub const WEATHER_LOAD_CONCURRENCY: usize = 4;
