use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChangeSet {
    pub timestamp: i64,
    pub checksum: String,
    pub data: String,
    pub source: String,
}

/// A single configuration change as stored by the config service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Change {
    pub id: String,
    pub path: String,
    pub author: String,
    pub comment: String,
    pub timestamp: i64,
    pub change_set: Option<ChangeSet>,
}

/// Audit log entry: the action taken plus the change it produced.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChangeLog {
    pub action: String,
    pub change: Option<Change>,
}

impl ChangeLog {
    pub fn timestamp(&self) -> i64 {
        self.change.as_ref().map(|c| c.timestamp).unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct AuditLogRequest {
    pub from: i64,
    pub to: i64,
    pub limit: i64,
    pub offset: i64,
    pub reverse: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditLogResponse {
    pub changes: Vec<ChangeLog>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub id: String,
    pub author: String,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchResponse {
    pub configs: Vec<Change>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ReadRequest {
    pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadResponse {
    pub change: Option<Change>,
}

/// Error body returned by the micro API gateway on non-2xx responses.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoteError {
    pub id: String,
    pub code: i32,
    pub detail: String,
    pub status: String,
}
