//! Global configuration constants for tripsearch.
//!
//! All tuning parameters, input validation limits, and server defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI arguments
//! and environment variables in the server's `main.rs`.

/// Relevance weight of the mood criterion in the canonical weight table.
pub const RELEVANCE_MOODS: f32 = 0.4;

/// Relevance weight of the trip duration (days) criterion.
pub const RELEVANCE_DAYS: f32 = 0.2;

/// Relevance weight of the group size (persons) criterion.
pub const RELEVANCE_PERSONS: f32 = 0.2;

/// Relevance weight of the deprecated budget criterion.
pub const RELEVANCE_BUDGET: f32 = 0.1;

/// Relevance weight of the deprecated accommodations criterion.
pub const RELEVANCE_ACCOMMODATIONS: f32 = 0.1;

/// Score given when every present criterion missed and their weights add up to 1 or more.
///
/// Keeps all-miss candidates above zero so they never collapse into a tie at 0.
pub const ALL_MISS_FLOOR: f32 = 1.0;

/// Delimiter between the city and mood tokens in `/trips/search/:opts`
/// (`berlin.beach.culture`) and inside the `moods` query parameter.
pub const QUERY_DELIMITER: char = '.';

/// Default page number for paginated listings (1-indexed).
pub const DEFAULT_PAGE: usize = 1;

/// Default number of trips per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Maximum number of moods a trip may carry.
pub const MAX_MOODS: usize = 3;

/// Maximum number of moods a search query may request.
pub const MAX_QUERY_MOODS: usize = 16;

/// Maximum number of pictures attached to a trip.
pub const MAX_PICS: usize = 20;

/// Maximum length of a trip title in characters.
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum length of a trip description in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 100_000;

/// Candidate count from which scoring is spread over the rayon pool.
pub const PARALLEL_SCAN_THRESHOLD: usize = 2_048;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 3030;

/// Default directory for snapshot files.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the trip store snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "trips.snapshot";

/// Default interval (in seconds) between automatic snapshots. 0 = disabled.
pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 300;

/// Default interval (in seconds) between integrity sweeps over all stored trips. 0 = disabled.
pub const DEFAULT_INTEGRITY_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Global rate limit in requests per second.
pub const RATE_LIMIT_RPS: u64 = 100;

/// Maximum HTTP request body size in bytes (1 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Base path picture requests are redirected to.
pub const PICTURE_REDIRECT_BASE: &str = "/api/v1/data";

/// Picture extensions accepted by the picture redirect route.
pub const PICTURE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];
