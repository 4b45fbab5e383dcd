//! Process exit statuses.

pub const SUCCESS: i32 = 0;
pub const GENERAL_ERROR: i32 = 1;
/// Reserved for clap's own usage errors.
pub const USAGE_ERROR: i32 = 2;
pub const CONFIG_ERROR: i32 = 3;
pub const CONNECTION_ERROR: i32 = 4;
