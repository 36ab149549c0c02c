//! Display ordering for record sets returned by the config service.
//!
//! The backend's own ordering is not trusted for presentation; these sorts are
//! reapplied after every fetch. Both are stable, so records with equal keys
//! keep the order the backend returned them in.

use crate::rpc::{Change, ChangeLog};

/// Orders audit log entries by change timestamp, oldest first unless `reverse`.
pub fn sort_change_logs(logs: &mut [ChangeLog], reverse: bool) {
    logs.sort_by(|a, b| {
        let ord = a.timestamp().cmp(&b.timestamp());
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Orders search results by config id, ascending.
pub fn sort_configs(configs: &mut [Change]) {
    configs.sort_by(|a, b| a.id.cmp(&b.id));
}
