//! ACS 5-year detailed table B18105: sex by age by ambulatory difficulty.

/// Universe: civilian noninstitutionalized population 5 years and over.
pub const TOTAL_5PLUS: &str = "B18105_001E";

/// "With an ambulatory difficulty", every age band, male then female.
pub const WITH_DIFFICULTY: [&str; 10] = [
    "B18105_004E", // male 5-17
    "B18105_007E", // male 18-34
    "B18105_010E", // male 35-64
    "B18105_013E", // male 65-74
    "B18105_016E", // male 75+
    "B18105_020E", // female 5-17
    "B18105_023E", // female 18-34
    "B18105_026E", // female 35-64
    "B18105_029E", // female 65-74
    "B18105_032E", // female 75+
];

/// Age-band totals for 65-74 and 75+.
pub const SENIOR_TOTALS: [&str; 4] = [
    "B18105_012E",
    "B18105_015E",
    "B18105_028E",
    "B18105_031E",
];

/// Subset of [`WITH_DIFFICULTY`] covering 65-74 and 75+.
pub const SENIOR_WITH_DIFFICULTY: [&str; 4] = [
    "B18105_013E",
    "B18105_016E",
    "B18105_029E",
    "B18105_032E",
];

pub const VARIABLE_COUNT: usize = 15;

/// Every estimate requested from the API, in request order.
pub const VARIABLES: [&str; VARIABLE_COUNT] = [
    TOTAL_5PLUS,
    "B18105_004E",
    "B18105_007E",
    "B18105_010E",
    "B18105_013E",
    "B18105_016E",
    "B18105_020E",
    "B18105_023E",
    "B18105_026E",
    "B18105_029E",
    "B18105_032E",
    "B18105_012E",
    "B18105_015E",
    "B18105_028E",
    "B18105_031E",
];

pub const NAME_FIELD: &str = "NAME";
pub const STATE_FIELD: &str = "state";
pub const COUNTY_FIELD: &str = "county";
pub const TRACT_FIELD: &str = "tract";

/// Derived columns appended to the tract table, in output order.
pub const DERIVED_COLUMNS: [&str; 6] = [
    "total_pop_5plus",
    "total_amb_diff",
    "total_amb_diff_pct",
    "pop_65plus",
    "pop_65plus_amb_diff",
    "pop_65plus_amb_diff_pct",
];

/// Position of `code` within [`VARIABLES`].
pub fn variable_index(code: &str) -> Option<usize> {
    VARIABLES.iter().position(|v| *v == code)
}
