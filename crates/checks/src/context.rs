use std::collections::BTreeSet;

use dirhealth_doc_core::authority::AuthorityDirectory;
use time::OffsetDateTime;

/// Static knowledge the checks compare the documents against
#[derive(Debug, Clone)]
pub struct CheckContext {
    /// Time the checks are evaluated at
    pub now: OffsetDateTime,
    pub directory: AuthorityDirectory,
    /// Consensus parameters we recognize
    pub known_params: BTreeSet<String>,
}

#[bon::bon]
impl CheckContext {
    #[builder]
    pub fn new(
        #[builder(default = OffsetDateTime::now_utc())] now: OffsetDateTime,
        directory: AuthorityDirectory,
        #[builder(default)]
        known_params: BTreeSet<String>,
    ) -> Self {
        Self {
            now,
            directory,
            known_params,
        }
    }
}

impl CheckContext {
    /// Parameter names starting with this are reserved for bandwidth
    /// scanners and always accepted
    pub const RESERVED_PARAM_PREFIX: &str = "bwauth";

    pub fn is_known_param(&self, name: &str) -> bool {
        self.known_params.contains(name) || name.starts_with(Self::RESERVED_PARAM_PREFIX)
    }
}
