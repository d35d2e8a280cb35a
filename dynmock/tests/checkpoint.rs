// vim: tw=80
//! Checkpoints verify and then discard all expectations
#![deny(warnings)]

use dynmock::*;

#[test]
fn ok() {
    let mock = Mock::new("m");
    mock.expect("foo").at_least_once();
    mock.invoke("foo", args![]).unwrap();
    mock.checkpoint().unwrap();
    assert_eq!(0, mock.expectation_count());
}

#[test]
fn expect_again() {
    let mock = Mock::new("m");
    mock.expect("foo").and_return(5);
    mock.invoke("foo", args![]).unwrap();
    mock.checkpoint().unwrap();

    mock.expect("foo").and_return(25);
    let v = mock.invoke("foo", args![]).unwrap();
    assert_eq!(Some(&25), v.get::<i32>());
}

#[test]
fn not_yet_satisfied() {
    let mock = Mock::new("m");
    mock.expect("foo").twice();
    mock.invoke("foo", args![]).unwrap();
    let e = mock.checkpoint().unwrap_err();
    assert_eq!("Mock 'm' expected foo twice, but received it 1 times",
               e.to_string());
    // The expectations are gone even though they failed, so dropping the
    // mock doesn't panic
    assert_eq!(0, mock.expectation_count());
}

#[test]
fn removes_old_expectations() {
    let mock = Mock::new("m");
    mock.expect("foo");
    mock.invoke("foo", args![]).unwrap();
    mock.checkpoint().unwrap();
    let e = mock.invoke("foo", args![]).unwrap_err();
    assert!(matches!(e, Error::UnexpectedMessage{..}));
}
