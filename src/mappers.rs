//! Static reference mappings for NYC community districts.
//!
//! Two immutable lookup tables, kept as plain data so they are trivially
//! testable and swappable if the city ever redraws district boundaries:
//!
//! - raw community-board label -> normalized 3-digit district code
//!   (borough digit * 100 + district number, 0 for "Unspecified")
//! - normalized district code -> human-readable neighborhood name
//!
//! Several legacy labels collapse to borough-level sentinel codes (100, 200,
//! 300, 400, 500); those sentinels intentionally have no neighborhood name.

use polars::prelude::*;

/// Raw community-board labels observed in the 311 extract, mapped to
/// normalized district codes. Labels absent from this table pass through
/// the complaint transform unchanged.
pub const COMMUNITY_DISTRICTS: &[(&str, i32)] = &[
    ("0 Unspecified", 0),
    ("01 BRONX", 101),
    ("01 BROOKLYN", 201),
    ("01 MANHATTAN", 301),
    ("01 QUEENS", 401),
    ("01 STATEN ISLAND", 501),
    ("02 BRONX", 102),
    ("02 BROOKLYN", 202),
    ("02 MANHATTAN", 302),
    ("02 QUEENS", 402),
    ("02 STATEN ISLAND", 502),
    ("03 BRONX", 103),
    ("03 BROOKLYN", 203),
    ("03 MANHATTAN", 303),
    ("03 QUEENS", 403),
    ("03 STATEN ISLAND", 503),
    ("04 BRONX", 104),
    ("04 BROOKLYN", 204),
    ("04 MANHATTAN", 304),
    ("04 QUEENS", 404),
    ("05 BRONX", 105),
    ("05 BROOKLYN", 205),
    ("05 MANHATTAN", 305),
    ("05 QUEENS", 405),
    ("06 BRONX", 106),
    ("06 BROOKLYN", 206),
    ("06 MANHATTAN", 306),
    ("06 QUEENS", 406),
    ("07 BRONX", 107),
    ("07 BROOKLYN", 207),
    ("07 MANHATTAN", 307),
    ("07 QUEENS", 407),
    ("08 BRONX", 108),
    ("08 BROOKLYN", 208),
    ("08 MANHATTAN", 308),
    ("08 QUEENS", 408),
    ("09 BRONX", 109),
    ("09 BROOKLYN", 209),
    ("09 MANHATTAN", 309),
    ("09 QUEENS", 409),
    ("10 BRONX", 110),
    ("10 BROOKLYN", 210),
    ("10 MANHATTAN", 310),
    ("10 QUEENS", 410),
    ("11 BRONX", 111),
    ("11 BROOKLYN", 211),
    ("11 MANHATTAN", 311),
    ("11 QUEENS", 411),
    ("12 BRONX", 112),
    ("12 BROOKLYN", 212),
    ("12 MANHATTAN", 312),
    ("12 QUEENS", 412),
    ("13 BROOKLYN", 213),
    ("13 QUEENS", 413),
    ("14 BROOKLYN", 214),
    ("14 QUEENS", 414),
    ("15 BROOKLYN", 215),
    ("16 BROOKLYN", 216),
    ("17 BROOKLYN", 217),
    ("18 BROOKLYN", 218),
    // Legacy / renumbered boards collapse to borough-level sentinels
    ("26 BRONX", 100),
    ("27 BRONX", 100),
    ("28 BRONX", 100),
    ("55 BROOKLYN", 200),
    ("56 BROOKLYN", 200),
    ("64 MANHATTAN", 300),
    ("80 QUEENS", 400),
    ("81 QUEENS", 400),
    ("82 QUEENS", 400),
    ("83 QUEENS", 400),
    ("84 QUEENS", 400),
    ("95 STATEN ISLAND", 500),
    ("Unspecified BRONX", 100),
    ("Unspecified BROOKLYN", 200),
    ("Unspecified MANHATTAN", 300),
    ("Unspecified QUEENS", 400),
    ("Unspecified STATEN ISLAND", 500),
];

/// Valid 3-digit community-district codes mapped to neighborhood names.
/// Borough-level sentinels and "unspecified" are intentionally absent.
pub const NEIGHBORHOOD_NAMES: &[(i32, &str)] = &[
    (101, "Mott Haven/Melrose"),
    (102, "Hunts Point/Longwood"),
    (103, "Morrisania/Crotona"),
    (104, "Highbridge/Concourse"),
    (105, "Fordham/University Heights"),
    (106, "Belmont/East Tremont"),
    (107, "Kingsbridge Hghts/Bedford"),
    (108, "Riverdale/Fieldston"),
    (109, "Parkchester/Soundview"),
    (110, "Throgs Neck/Co-op City"),
    (111, "Morris Park/Bronxdale"),
    (112, "Williamsbridge/Baychester"),
    (201, "Greenpoint/Williamsburg"),
    (202, "Fort Greene/Brooklyn Heights"),
    (203, "Bedford Stuyvesant"),
    (204, "Bushwick"),
    (205, "East New York/Starrett City"),
    (206, "Park Slope/Carroll Gardens"),
    (207, "Sunset Park"),
    (208, "Crown Heights"),
    (209, "S. Crown Heights/Prospect Heights"),
    (210, "Bay Ridge/Dyker Heights"),
    (211, "Bensonhurst"),
    (212, "Borough Park"),
    (213, "Coney Island"),
    (214, "Flatbush/Midwood"),
    (215, "Sheepshead Bay"),
    (216, "Brownsville"),
    (217, "East Flatbush"),
    (218, "Flatlands/Canarsie"),
    (301, "Financial District"),
    (302, "Greenwich Village/Soho"),
    (303, "Lower East Side/Chinatown"),
    (304, "Clinton/Chelsea"),
    (305, "Midtown"),
    (306, "Stuyvesant Town/Turtle Bay"),
    (307, "Upper West Side"),
    (308, "Upper East Side"),
    (309, "Morningside Heights/Hamilton Heights"),
    (310, "Central Harlem"),
    (311, "East Harlem"),
    (312, "Washington Heights/Inwood"),
    (401, "Astoria"),
    (402, "Woodside/Sunnyside"),
    (403, "Jackson Heights"),
    (404, "Elmhurst/Corona"),
    (405, "Ridgewood/Maspeth"),
    (406, "Rego Park/Forest Hills"),
    (407, "Flushing/Whitestone"),
    (408, "Hillcrest/Fresh Meadows"),
    (409, "Kew Gardens/Woodhaven"),
    (410, "South Ozone Park/Howard Beach"),
    (411, "Bayside/Little Neck"),
    (412, "Jamaica/Hollis"),
    (413, "Queens Village"),
    (414, "Rockaway/Broad Channel"),
    (501, "St. George/Stapleton"),
    (502, "South Beach/Willowbrook"),
    (503, "Tottenville/Great Kills"),
];

/// The label table as a pair of equal-length Series for a replace-if-present
/// expression. Codes are rendered as decimal strings so that unmatched labels
/// can pass through the same string column unchanged.
pub fn district_replace_series() -> (Series, Series) {
    let labels: Vec<&str> = COMMUNITY_DISTRICTS.iter().map(|(label, _)| *label).collect();
    let codes: Vec<String> = COMMUNITY_DISTRICTS
        .iter()
        .map(|(_, code)| code.to_string())
        .collect();
    (
        Series::new("labels".into(), labels),
        Series::new("codes".into(), codes),
    )
}

/// The neighborhood-name table as a two-column frame for joining against
/// demographics region codes.
pub fn neighborhood_frame() -> PolarsResult<DataFrame> {
    let codes: Vec<i64> = NEIGHBORHOOD_NAMES.iter().map(|(code, _)| *code as i64).collect();
    let names: Vec<&str> = NEIGHBORHOOD_NAMES.iter().map(|(_, name)| *name).collect();
    df!(
        "region_id" => codes,
        "region_name" => names,
    )
}

/// Normalized district code for a raw community-board label, if known.
pub fn district_code(label: &str) -> Option<i32> {
    COMMUNITY_DISTRICTS
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|(_, code)| *code)
}

/// Neighborhood name for a valid 3-digit district code, if one exists.
pub fn neighborhood_name(code: i32) -> Option<&'static str> {
    NEIGHBORHOOD_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
