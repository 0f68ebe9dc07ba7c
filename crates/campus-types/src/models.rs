use serde::{Deserialize, Serialize};

/// Lifecycle of a connection between two students. A request starts out
/// `pending`; only the receiving side may move it to `accepted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ConnectionStatus::Pending),
            "accepted" => Some(ConnectionStatus::Accepted),
            _ => None,
        }
    }
}

/// RSVP status for an event. One row per (event, student); there is no
/// update path once registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Attending,
    Interested,
    NotAttending,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Attending => "attending",
            AttendanceStatus::Interested => "interested",
            AttendanceStatus::NotAttending => "not_attending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "attending" => Some(AttendanceStatus::Attending),
            "interested" => Some(AttendanceStatus::Interested),
            "not_attending" => Some(AttendanceStatus::NotAttending),
            _ => None,
        }
    }
}
