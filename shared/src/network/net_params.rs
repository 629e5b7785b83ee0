/// Version of the report frame layout, sent first on every connection.
/// If the fields of `GameReport` or their order change, change this value.
pub const REPORTER_PROTOCOL: u16 = 0;

pub const DEFAULT_SERVER_HOST: &str = "localhost";
pub const DEFAULT_SERVER_PORT: u16 = 61234;

pub const RETRY_CONNECT_COUNT: usize = 5;
pub const RETRY_CONNECT_INTERVAL_MS: u64 = 1000;
pub const CONNECT_TIMEOUT_MS: u64 = 2000;

pub const MAX_WAIT_TIME_IN_READ_WRITE_MS: u64 = 120000; // 2 minutes
