//! ServiceStatus - last observed delivery health per service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last observed delivery health of a service.
///
/// Written by dispatchers after a delivery attempt; a service that has not
/// been dispatched to yet has no status at all (the board returns `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Last delivery attempt reached the other end.
    Online,
    /// Last delivery attempt failed at the transport level.
    Offline,
}

impl ServiceStatus {
    /// Status as the wire-level string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_serde_agree() {
        assert_eq!(ServiceStatus::Online.to_string(), "online");
        assert_eq!(
            serde_json::to_string(&ServiceStatus::Offline).unwrap(),
            "\"offline\""
        );
    }
}
