//! Query options for cache lookups.

use serde::{Deserialize, Serialize};

/// Options controlling how a query request is compared with stored keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheQueryOptions {
    /// Strip the query string from both the query and the stored key.
    #[serde(default)]
    pub ignore_search: bool,
    /// Accept query requests whose method is not GET.
    #[serde(default)]
    pub ignore_method: bool,
}

impl CacheQueryOptions {
    pub fn ignore_search(mut self, value: bool) -> Self {
        self.ignore_search = value;
        self
    }

    pub fn ignore_method(mut self, value: bool) -> Self {
        self.ignore_method = value;
        self
    }
}
