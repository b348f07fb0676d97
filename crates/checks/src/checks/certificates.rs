use dirhealth_doc_core::document::{KeyCertificate, Vote};
use snafu::{OptionExt as _, ResultExt as _};
use time::Duration;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::error;

use crate::engine::CheckInput;
use crate::issue::{Issue, IssueKind, Runlevel};
use crate::{CheckResult, LOG_TARGET, MalformedVoteSnafu, TimeFormatSnafu};

const EXPIRATION_LABEL_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]-[minute]-[second]");

/// Warning bands, narrowest first
const EXPIRATION_BANDS: [(i64, Runlevel, &str); 3] = [
    (7, Runlevel::Warning, "week"),
    (14, Runlevel::Warning, "two weeks"),
    (21, Runlevel::Notice, "three weeks"),
];

/// Check if an authority's certificate is about to expire
///
/// A vote without a certificate is logged and skipped, the other
/// authorities are still checked.
pub fn certificate_expiration(input: &CheckInput<'_>) -> CheckResult<Vec<Issue>> {
    let mut issues = vec![];

    for (authority, vote) in &input.store.votes {
        let cert = match key_certificate(authority, vote) {
            Ok(cert) => cert,
            Err(err) => {
                error!(target: LOG_TARGET, %err, "Unable to check certificate expiration");
                continue;
            }
        };

        let remaining = cert.expires - input.ctx.now;
        let Some((_, runlevel, duration)) = EXPIRATION_BANDS
            .iter()
            .find(|(days, _, _)| remaining <= Duration::days(*days))
        else {
            continue;
        };

        let label = format!(
            "{authority} ({})",
            cert.expires
                .format(EXPIRATION_LABEL_FORMAT)
                .context(TimeFormatSnafu)?
        );

        issues.push(
            Issue::new(*runlevel, IssueKind::CertificateAboutToExpire)
                .attr("duration", *duration)
                .attr("authority", label)
                .concerning([authority.as_str()]),
        );
    }

    Ok(issues)
}

fn key_certificate<'v>(authority: &str, vote: &'v Vote) -> CheckResult<&'v KeyCertificate> {
    let issuer = vote.issuer().context(MalformedVoteSnafu {
        authority,
        reason: "vote has no directory authority entry",
    })?;
    issuer.key_certificate.as_ref().context(MalformedVoteSnafu {
        authority,
        reason: "vote has no key certificate",
    })
}
