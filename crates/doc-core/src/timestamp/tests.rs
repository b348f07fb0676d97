use time::macros::datetime;

use super::Timestamp;

#[test]
fn timestamp_datetime_conversion() {
    let ts = Timestamp::from_datetime(datetime!(2024-03-01 12:00:00 UTC));
    assert_eq!(ts.to_number(), 1_709_294_400);
    assert_eq!(ts.to_datetime(), Some(datetime!(2024-03-01 12:00:00 UTC)));

    assert_eq!(
        Timestamp::from_datetime(datetime!(1960-01-01 00:00:00 UTC)),
        Timestamp::ZERO
    );
}

#[test]
fn timestamp_secs_since_saturates() {
    let early = Timestamp::from(100);
    let late = Timestamp::from(160);
    assert_eq!(late.secs_since(early), 60);
    assert_eq!(early.secs_since(late), 0);
}
