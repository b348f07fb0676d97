use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use dirhealth_checks::store::PortProbe;
use dirhealth_doc_core::authority::AuthorityDirectory;
use dirhealth_util_error::fmt::FmtCompact as _;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::LOG_TARGET;

/// Try connecting to the OR ports of every non-ignored authority
pub async fn probe_authorities(
    directory: &AuthorityDirectory,
    timeout: Duration,
) -> BTreeMap<String, Vec<PortProbe>> {
    let mut tasks = JoinSet::new();

    for authority in directory.active() {
        for endpoint in authority.or_endpoints() {
            let nickname = authority.nickname.clone();
            tasks.spawn(async move { (nickname, probe(endpoint, timeout).await) });
        }
    }

    let mut results: BTreeMap<String, Vec<PortProbe>> = BTreeMap::new();
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok((nickname, probe)) => results.entry(nickname).or_default().push(probe),
            Err(err) => {
                error!(target: LOG_TARGET, err = %err.fmt_compact(), "Probe task failed");
            }
        }
    }

    // Completion order is arbitrary
    for probes in results.values_mut() {
        probes.sort_by_key(|probe| probe.endpoint);
    }

    results
}

async fn probe(endpoint: SocketAddr, timeout: Duration) -> PortProbe {
    match tokio::time::timeout(timeout, TcpStream::connect(endpoint)).await {
        Ok(Ok(_stream)) => {
            debug!(target: LOG_TARGET, %endpoint, "OR port reachable");
            PortProbe::reachable(endpoint)
        }
        Ok(Err(err)) => {
            debug!(target: LOG_TARGET, %endpoint, err = %err.fmt_compact(), "OR port unreachable");
            PortProbe::unreachable(endpoint, err.to_string())
        }
        Err(_) => {
            debug!(target: LOG_TARGET, %endpoint, "OR port timed out");
            PortProbe::unreachable(
                endpoint,
                format!("Timed out after {}s", timeout.as_secs_f32()),
            )
        }
    }
}
