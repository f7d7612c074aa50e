// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

use crate::types::DateTime;

#[test]
fn epoch() {
    let epoch = DateTime::epoch();
    assert_eq!(epoch.ticks(), 0);
    assert!(epoch.is_null());
    assert_eq!(epoch.as_chrono().timestamp(), -11_644_473_600);
}

#[test]
fn null_is_epoch() {
    assert_eq!(DateTime::null(), DateTime::epoch());
}

#[test]
fn ticks_round_trip() {
    let now = DateTime::now();
    let ticks = now.checked_ticks();
    assert_eq!(DateTime::from(ticks), now);
}

#[test]
fn ticks_are_100ns_intervals() {
    // One second past the epoch is 10 million ticks
    let dt = DateTime::ymd_hms(1601, 1, 1, 0, 0, 1);
    assert_eq!(dt.ticks(), 10_000_000);
}

#[test]
fn endtimes_clamp() {
    // Out of range dates clamp to 0 / i64::MAX
    let before_epoch = DateTime::ymd_hms(1600, 12, 31, 23, 59, 59);
    assert_eq!(before_epoch.checked_ticks(), 0);

    let endtimes = DateTime::endtimes();
    assert_eq!(endtimes.checked_ticks(), DateTime::endtimes_ticks());
    assert_eq!(DateTime::from(i64::MAX), DateTime::endtimes());
}

#[test]
fn ordering() {
    let a = DateTime::ymd(2001, 1, 1);
    let b = DateTime::ymd(2002, 1, 1);
    assert!(a < b);
    assert!(b > a);
    assert_eq!(a, DateTime::ymd(2001, 1, 1));
}
