// vim: tw=80
//! Expected call counts, and how they are reported when not met
#![deny(warnings)]

use dynmock::*;
use pretty_assertions::assert_eq;

fn mock() -> Mock {
    Mock::with_options("m", MockOptions::new().verify_on_drop(false))
}

fn call_n(mock: &Mock, message: &str, n: usize) {
    for _ in 0..n {
        mock.invoke(message, args![]).unwrap();
    }
}

#[test]
fn once_by_default() {
    let mock = mock();
    let e = mock.expect("foo");
    assert_eq!(Expected::Exactly(1), e.expected());
    assert_eq!("Mock 'm' expected foo once, but received it 0 times",
               mock.verify_all().unwrap_err().to_string());
    call_n(&mock, "foo", 1);
    mock.verify_all().unwrap();
}

#[test]
fn never() {
    let mock = mock();
    mock.expect("foo").never();
    mock.verify_all().unwrap();
    call_n(&mock, "foo", 1);
    assert_eq!("Mock 'm' expected foo never, but received it 1 times",
               mock.verify_all().unwrap_err().to_string());
}

#[test]
fn twice() {
    let mock = mock();
    mock.expect("foo").twice();
    call_n(&mock, "foo", 1);
    assert_eq!("Mock 'm' expected foo twice, but received it 1 times",
               mock.verify_all().unwrap_err().to_string());
    call_n(&mock, "foo", 1);
    mock.verify_all().unwrap();
    call_n(&mock, "foo", 1);
    assert!(mock.verify_all().is_err());
}

#[test]
fn exactly() {
    let mock = mock();
    mock.expect("foo").with_args(args![5u8]).exactly(3);
    for _ in 0..2 {
        mock.invoke("foo", args![5u8]).unwrap();
    }
    assert_eq!("Mock 'm' expected foo(<5:u8>) 3 times, but received it 2 times",
               mock.verify_all().unwrap_err().to_string());
    mock.invoke("foo", args![5u8]).unwrap();
    mock.verify_all().unwrap();
}

#[test]
fn at_least_once() {
    let mock = mock();
    mock.expect("foo").at_least_once();
    assert_eq!("Mock 'm' expected foo at least once, but received it 0 times",
               mock.verify_all().unwrap_err().to_string());
    call_n(&mock, "foo", 5);
    mock.verify_all().unwrap();
}

#[test]
fn at_least_once_phrase() {
    let mock = mock();
    let e = mock.expect("foo");
    e.at().least(Once);
    assert_eq!(Expected::AtLeastOnce, e.expected());
}

#[test]
fn any_number_of_times() {
    let mock = mock();
    mock.expect("foo").any_number_of_times();
    mock.verify_all().unwrap();
    call_n(&mock, "foo", 10);
    mock.verify_all().unwrap();
}

#[test]
fn any_number_of_times_phrase() {
    let mock = mock();
    let e = mock.expect("foo");
    e.any().number().of().times();
    assert_eq!(Expected::AnyNumber, e.expected());
}

/// "and" is filler
#[test]
fn and() {
    let mock = mock();
    let e = mock.expect("foo");
    e.and().twice().and().and_return(1);
    assert_eq!(Expected::Exactly(2), e.expected());
}

#[test]
fn incomplete_phrases_do_nothing() {
    let mock = mock();
    let e = mock.expect("foo");
    e.twice();
    e.least(Once);
    e.times();
    e.number().of().times();
    assert_eq!(Expected::Exactly(2), e.expected());
}

#[test]
fn last_setting_wins() {
    let mock = mock();
    let e = mock.expect("foo");
    e.at_least_once().never().exactly(4);
    assert_eq!(Expected::Exactly(4), e.expected());
}

/// verify_all reports the first failure; unmet_expectations reports them all
#[test]
fn all_failures() {
    let mock = mock();
    mock.expect("a");
    mock.expect("b").any_number_of_times();
    mock.expect("c").twice();
    assert_eq!("Mock 'm' expected a once, but received it 0 times",
               mock.verify_all().unwrap_err().to_string());
    let all = mock.unmet_expectations()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(vec![
        "Mock 'm' expected a once, but received it 0 times".to_owned(),
        "Mock 'm' expected c twice, but received it 0 times".to_owned(),
    ], all);
}

/// Verification doesn't consume anything, so it may be repeated
#[test]
fn verify_is_repeatable() {
    let mock = mock();
    mock.expect("foo");
    assert!(mock.verify_all().is_err());
    assert!(mock.verify_all().is_err());
    call_n(&mock, "foo", 1);
    mock.verify_all().unwrap();
    mock.verify_all().unwrap();
}

/// A whole declaration chain can be kept in a variable
#[test]
fn bind_chain() {
    let mock = mock();
    let e = mock.expect("foo").with_args(args![1]).twice().and_return(5);
    let f = mock.expect("bar").at().least(Once);
    assert_eq!(Expected::Exactly(2), e.expected());
    assert_eq!(Expected::AtLeastOnce, f.expected());
    mock.invoke("foo", args![1]).unwrap();
    mock.invoke("foo", args![1]).unwrap();
    mock.invoke("bar", args![]).unwrap();
    assert_eq!(2, e.received());
    assert_eq!(1, f.received());
    mock.verify_all().unwrap();
}
