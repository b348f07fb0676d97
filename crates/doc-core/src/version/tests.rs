use super::TorVersion;

fn v(s: &str) -> TorVersion {
    s.parse().expect("Valid version")
}

#[test]
fn version_parsing() {
    assert_eq!(
        v("0.4.9.1-alpha-dev"),
        TorVersion {
            major: 0,
            minor: 4,
            micro: 9,
            patch: Some(1),
            status: Some("alpha-dev".into()),
        }
    );
    assert_eq!(v("0.4.8.12 (git-1d2c3b4a)").to_string(), "0.4.8.12");
    assert_eq!(v("1.2.3").patch, None);

    "0.4".parse::<TorVersion>().expect_err("Too few components");
    "0.4.x.1".parse::<TorVersion>().expect_err("Not numeric");
    "0.4.8.1-".parse::<TorVersion>().expect_err("Empty status");
    "".parse::<TorVersion>().expect_err("Empty");
}

#[test]
fn version_ordering() {
    assert!(v("0.4.8.9") < v("0.4.8.10"));
    assert!(v("0.4.7.16") < v("0.4.8.1"));
    assert!(v("0.4.8.1-alpha") < v("0.4.8.1"));
    assert!(v("0.4.8.1-alpha") < v("0.4.8.1-rc"));
    assert!(v("0.4.8") < v("0.4.8.1"));
    assert_eq!(
        [v("0.4.8.12"), v("0.4.7.16"), v("0.4.9.1-alpha")]
            .into_iter()
            .min(),
        Some(v("0.4.7.16"))
    );
}
