use serde::{Deserialize, Serialize};

/// Terminal/non-terminal state of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    InProcess,
    Completed,
    OutOfRetries,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::OutOfRetries)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::InProcess => write!(f, "in_process"),
            Status::Completed => write!(f, "completed"),
            Status::OutOfRetries => write!(f, "out_of_retries"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_process" => Ok(Status::InProcess),
            "completed" => Ok(Status::Completed),
            "out_of_retries" => Ok(Status::OutOfRetries),
            other => Err(format!("unknown status: {other}")),
        }
    }
}
