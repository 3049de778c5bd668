// src/constants.rs

use std::time::Duration;

pub const REPLY_NOT_IMPLEMENTED: &str = "502 Error: command not implemented";
pub const REPLY_TOO_MANY_SESSIONS: &str = "421 Too many connections, try again later.";

/// Pause after a failed accept before polling the control listener again.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(1);
