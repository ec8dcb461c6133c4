use std::fmt::Display;

use log::{debug, info, warn};
use uuid::Uuid;

pub fn init() {
    pretty_env_logger::init_timed();
}

/// Logger scoped to one webhook request. Every line carries the request id;
/// `trace` lines are promoted to info when verbose logging is on.
#[derive(Debug, Clone)]
pub struct RequestLog {
    id: Uuid,
    verbose: bool,
}

impl RequestLog {
    pub fn new(verbose: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            verbose,
        }
    }

    pub fn trace(&self, msg: impl Display) {
        if self.verbose {
            info!("[{}] {}", self.id, msg);
        } else {
            debug!("[{}] {}", self.id, msg);
        }
    }

    pub fn info(&self, msg: impl Display) {
        info!("[{}] {}", self.id, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        warn!("[{}] {}", self.id, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_request_gets_its_own_id() {
        let a = RequestLog::new(false);
        let b = RequestLog::new(true);
        assert_ne!(a.id, b.id);
    }
}
