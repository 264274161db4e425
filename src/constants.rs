//! Application constants for the geodata standardizer.

/// Version stamped into metadata by the standardization pass.
pub const STANDARDIZATION_VERSION: &str = "1.0";

/// Suffix appended to the output stem for the metadata sidecar.
pub const METADATA_FILE_SUFFIX: &str = "_metadata.json";

/// Suffix inserted into auto-generated output filenames.
pub const OUTPUT_STEM_SUFFIX: &str = "_standardized";

/// Canonical column names shared across the pipeline.
pub mod columns {
    // Identifier columns
    pub const STATION_ID: &str = "station_id";
    pub const TRACE_NUMBER: &str = "trace_number";
    pub const SAMPLE_NUMBER: &str = "sample_number";

    // Electrical measurement columns
    pub const DEPTH_M: &str = "depth_m";
    pub const RESISTIVITY_OHM_M: &str = "resistivity_ohm_m";
    pub const CURRENT_MA: &str = "current_ma";
    pub const VOLTAGE_MV: &str = "voltage_mv";

    // Seismic measurement columns
    pub const TIME_MS: &str = "time_ms";
    pub const AMPLITUDE: &str = "amplitude";
    pub const OFFSET_M: &str = "offset_m";

    // Radar measurement columns
    pub const DISTANCE_M: &str = "distance_m";
    pub const TIME_NS: &str = "time_ns";
    pub const ANTENNA_FREQ_MHZ: &str = "antenna_freq_mhz";
}

/// QC check names, in the fixed order they are run.
pub mod checks {
    pub const MISSING_VALUES: &str = "missing_values";
    pub const DUPLICATES: &str = "duplicates";
    pub const OUTLIERS: &str = "outliers";
    pub const CONSISTENCY: &str = "consistency";

    pub const ALL: &[&str] = &[MISSING_VALUES, DUPLICATES, OUTLIERS, CONSISTENCY];
}

/// Metadata keys written by parsers and the standardizer.
pub mod metadata_keys {
    pub const FILE_NAME: &str = "file_name";
    pub const FILE_PATH: &str = "file_path";
    pub const CREATED_AT: &str = "created_at";
    pub const DATA_TYPE: &str = "data_type";
    pub const RECORD_COUNT: &str = "record_count";
    pub const STANDARDIZED_AT: &str = "standardized_at";
    pub const STANDARDIZATION_VERSION: &str = "standardization_version";
}
