use crate::engine::{AnimTime, TimeSeries};

fn t(s: f64) -> AnimTime {
    AnimTime::from_secs(s)
}

#[test]
fn value_at_returns_nearest_preceding_sample() {
    let mut series = TimeSeries::default();
    series.add(t(1.0), "a");
    series.add(t(2.0), "b");
    assert_eq!(series.value_at(t(1.0)), Some(&"a"));
    assert_eq!(series.value_at(t(1.5)), Some(&"a"));
    assert_eq!(series.value_at(t(2.0)), Some(&"b"));
}

#[test]
fn value_at_clamps_low_before_first_sample() {
    let mut series = TimeSeries::default();
    series.add(t(5.0), 42);
    assert_eq!(series.value_at(t(-1.0)), Some(&42));
    assert_eq!(series.value_at(t(0.0)), Some(&42));
}

#[test]
fn value_at_clamps_high_after_last_sample() {
    let mut series = TimeSeries::default();
    series.add(t(1.0), 1);
    series.add(t(2.0), 2);
    assert_eq!(series.value_at(t(100.0)), Some(&2));
}

#[test]
fn empty_series_returns_none() {
    let mut series: TimeSeries<u32> = TimeSeries::default();
    assert_eq!(series.value_at(t(1.0)), None);
}

#[test]
fn same_timestamp_overwrites() {
    let mut series = TimeSeries::default();
    series.add(t(1.0), "old");
    series.add(t(1.0), "new");
    assert_eq!(series.len(), 1);
    assert_eq!(series.value_at(t(1.0)), Some(&"new"));
}

#[test]
fn out_of_order_add_is_sorted_in() {
    let mut series = TimeSeries::default();
    series.add(t(2.0), "b");
    series.add(t(1.0), "a");
    assert_eq!(series.value_at(t(1.5)), Some(&"a"));
}

#[test]
fn backward_query_after_forward_scan_is_correct() {
    let mut series = TimeSeries::default();
    series.add(t(1.0), "a");
    series.add(t(2.0), "b");
    series.add(t(3.0), "c");
    assert_eq!(series.value_at(t(3.0)), Some(&"c"));
    // cursor is now at the end; a backward query must rescan from the start
    assert_eq!(series.value_at(t(1.2)), Some(&"a"));
    assert_eq!(series.value_at(t(2.5)), Some(&"b"));
}

#[test]
fn peek_does_not_move_cursor() {
    let mut series = TimeSeries::default();
    series.add(t(1.0), "a");
    series.add(t(2.0), "b");
    assert_eq!(series.peek_at(t(2.5)), Some(&"b"));
    assert_eq!(series.value_at(t(1.0)), Some(&"a"));
}
