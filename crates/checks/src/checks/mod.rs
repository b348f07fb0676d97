//! The built-in checks
//!
//! Each check looks at one aspect of the network's health and reports what
//! it finds as [`Issue`]s. They run in the order of [`ALL`], which is also
//! the order their issues end up in the notification.

mod authorities;
mod bad_exit;
mod bandwidth;
mod certificates;
mod freshness;
mod methods;
mod network;
mod params;
mod versions;
mod votes;

use crate::engine::Check;
#[cfg(doc)]
use crate::issue::Issue;

pub use self::authorities::{has_authority_flag, has_expected_fingerprints, is_recommended_versions};
pub use self::bad_exit::bad_exits_in_sync;
pub use self::bandwidth::{bandwidth_authorities_in_sync, unmeasured_relays, voting_bandwidth_scanners};
pub use self::certificates::certificate_expiration;
pub use self::freshness::missing_latest_consensus;
pub use self::methods::consensus_method_unsupported;
pub use self::network::{authorities_reachable, slow_consensus_downloads};
pub use self::params::{unknown_consensus_parameters, vote_parameters_mismatch_consensus};
pub use self::versions::{different_recommended_client_version, different_recommended_server_version};
pub use self::votes::{consensuses_have_same_votes, has_all_signatures};

pub const ALL: [Check; 18] = [
    Check::new("missing_latest_consensus", missing_latest_consensus),
    Check::new("consensus_method_unsupported", consensus_method_unsupported),
    Check::new(
        "different_recommended_client_version",
        different_recommended_client_version,
    ),
    Check::new(
        "different_recommended_server_version",
        different_recommended_server_version,
    ),
    Check::new("unknown_consensus_parameters", unknown_consensus_parameters),
    Check::new(
        "vote_parameters_mismatch_consensus",
        vote_parameters_mismatch_consensus,
    ),
    Check::new("certificate_expiration", certificate_expiration),
    Check::new("consensuses_have_same_votes", consensuses_have_same_votes),
    Check::new("has_all_signatures", has_all_signatures),
    Check::new("voting_bandwidth_scanners", voting_bandwidth_scanners),
    Check::new("unmeasured_relays", unmeasured_relays).disabled_by_default(),
    Check::new("has_authority_flag", has_authority_flag),
    Check::new("is_recommended_versions", is_recommended_versions),
    Check::new("has_expected_fingerprints", has_expected_fingerprints).disabled_by_default(),
    Check::new("bad_exits_in_sync", bad_exits_in_sync),
    Check::new("bandwidth_authorities_in_sync", bandwidth_authorities_in_sync),
    Check::new("authorities_reachable", authorities_reachable),
    Check::new("slow_consensus_downloads", slow_consensus_downloads),
];

/// Comma separated list, as used in issue attributes
fn join<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> String {
    items
        .into_iter()
        .map(|item| item.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(", ")
}
