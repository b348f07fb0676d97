use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Boolean tag voted on by authorities and attached to a router entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Flag {
    Authority,
    BadExit,
    Exit,
    Fast,
    Guard,
    HsDir,
    MiddleOnly,
    Named,
    NoEdConsensus,
    Running,
    Stable,
    StaleDesc,
    Sybil,
    Unnamed,
    V2Dir,
    Valid,
    /// A flag this tool doesn't know about; kept verbatim
    Other(String),
}

impl Flag {
    pub fn as_str(&self) -> &str {
        match self {
            Flag::Authority => "Authority",
            Flag::BadExit => "BadExit",
            Flag::Exit => "Exit",
            Flag::Fast => "Fast",
            Flag::Guard => "Guard",
            Flag::HsDir => "HSDir",
            Flag::MiddleOnly => "MiddleOnly",
            Flag::Named => "Named",
            Flag::NoEdConsensus => "NoEdConsensus",
            Flag::Running => "Running",
            Flag::Stable => "Stable",
            Flag::StaleDesc => "StaleDesc",
            Flag::Sybil => "Sybil",
            Flag::Unnamed => "Unnamed",
            Flag::V2Dir => "V2Dir",
            Flag::Valid => "Valid",
            Flag::Other(s) => s,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Authority" => Flag::Authority,
            "BadExit" => Flag::BadExit,
            "Exit" => Flag::Exit,
            "Fast" => Flag::Fast,
            "Guard" => Flag::Guard,
            "HSDir" => Flag::HsDir,
            "MiddleOnly" => Flag::MiddleOnly,
            "Named" => Flag::Named,
            "NoEdConsensus" => Flag::NoEdConsensus,
            "Running" => Flag::Running,
            "Stable" => Flag::Stable,
            "StaleDesc" => Flag::StaleDesc,
            "Sybil" => Flag::Sybil,
            "Unnamed" => Flag::Unnamed,
            "V2Dir" => Flag::V2Dir,
            "Valid" => Flag::Valid,
            other => Flag::Other(other.to_owned()),
        })
    }
}

impl From<String> for Flag {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(flag) => flag,
            Err(never) => match never {},
        }
    }
}

impl From<Flag> for String {
    fn from(value: Flag) -> Self {
        value.as_str().to_owned()
    }
}

#[test]
fn flag_str_round_trip_keeps_unknown() {
    assert_eq!("HSDir".parse::<Flag>(), Ok(Flag::HsDir));
    assert_eq!(
        Flag::from("ReachableIPv6".to_owned()),
        Flag::Other("ReachableIPv6".into())
    );
    assert_eq!(Flag::Other("ReachableIPv6".into()).to_string(), "ReachableIPv6");
}
