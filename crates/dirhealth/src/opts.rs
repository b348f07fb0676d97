use std::path::PathBuf;

use clap::Parser;

/// Checks the health of the directory authorities' consensus and mails
/// the operators about anything that looks wrong
#[derive(Parser, Debug)]
#[command(version)]
pub(crate) struct Opts {
    /// Checker configuration: templates, authorities, recipients
    #[arg(
        long,
        env = "DIRHEALTH_CONFIG",
        default_value = "data/consensus_health.toml"
    )]
    pub config: PathBuf,

    /// Authority operator contacts, used only if the file exists
    #[arg(
        long,
        env = "DIRHEALTH_CONTACTS",
        default_value = "data/contact_information.toml"
    )]
    pub contacts: PathBuf,

    /// When each issue was last sent
    #[arg(long, env = "DIRHEALTH_STATE", default_value = "data/last_notified.json")]
    pub state: PathBuf,

    #[arg(long, env = "DIRHEALTH_SENDMAIL", default_value = "/usr/sbin/sendmail")]
    pub sendmail: PathBuf,

    #[arg(long, env = "DIRHEALTH_FROM", default_value = "consensus-health@localhost")]
    pub from: String,

    /// Print notifications instead of mailing them
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}
