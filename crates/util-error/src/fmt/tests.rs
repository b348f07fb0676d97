use snafu::{ResultExt as _, Snafu};

use super::FmtCompact as _;

#[derive(Debug, Snafu)]
#[snafu(display("outer failure"))]
struct Outer {
    source: std::io::Error,
}

#[test]
fn fmt_compact_joins_sources() {
    let res: Result<(), std::io::Error> = Err(std::io::Error::other("disk on fire"));
    let err = res.context(OuterSnafu).expect_err("Must fail");

    assert_eq!(err.fmt_compact().to_string(), "outer failure: disk on fire");
}
