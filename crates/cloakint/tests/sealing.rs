//! End-to-end behavior of sealed values under the process-wide key.

use std::collections::HashSet;

use cloakint::{CloakError, CloakedI32, CloakedU64};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn reference_scenario() {
    init_tracing();
    let a = CloakedU64::default();
    assert_eq!(a.get(), 0);

    let b = CloakedU64::new(10);
    let c = CloakedU64::new(20);
    let e = &b + &c;
    let f = &c - &b;
    let g = &b * &c;
    let h = &c / &b;
    let i = &c % &b;
    assert_eq!(e.get(), 30);
    assert_eq!(f.get(), 10);
    assert_eq!(g.get(), 200);
    assert_eq!(h.get(), 2);
    assert_eq!(i.get(), 0);

    let mut j = CloakedU64::new(3);
    j += &b;
    assert_eq!(u64::from(&j), 13);
}

#[test]
fn copies_are_independent() {
    let a = CloakedU64::new(0xfeed);
    let b = a.clone();
    assert_eq!(a.get(), b.get());
    assert_ne!(a.ciphertext(), b.ciphertext());

    let mut c = CloakedU64::new(1);
    c.assign_from(&a);
    assert_eq!(c.get(), 0xfeed);
    assert_ne!(c.ciphertext(), a.ciphertext());
}

#[test]
fn equal_values_are_unlinkable() {
    // 20k seals under a 32-bit salt collide about 0.05 times on average; a
    // salt narrowed to 24 bits would collide about 12 times.
    const SAMPLES: usize = 20_000;
    let distinct: HashSet<[u8; 16]> = (0..SAMPLES)
        .map(|_| *CloakedU64::new(7).ciphertext().as_bytes())
        .collect();
    assert!(SAMPLES - distinct.len() <= 2, "collisions: {}", SAMPLES - distinct.len());
}

#[test]
fn reads_do_not_change_ciphertext() {
    let v = CloakedI32::new(-17);
    let before = v.ciphertext().clone();
    assert_eq!(v.get(), -17);
    assert_eq!(&before, v.ciphertext());
}

#[test]
fn checked_division_by_zero_is_an_error() {
    let a = CloakedU64::new(5);
    let zero = CloakedU64::new(0);
    assert_eq!(a.try_div(&zero).unwrap_err(), CloakError::DivideByZero);
    assert_eq!(a.try_rem(&zero).unwrap_err(), CloakError::DivideByZero);
}

#[test]
#[should_panic(expected = "attempt to divide by zero")]
fn division_by_zero_faults() {
    let _ = CloakedU64::new(5) / CloakedU64::new(0);
}

#[test]
#[should_panic(expected = "divisor of zero")]
fn remainder_by_zero_faults() {
    let _ = CloakedU64::new(5) % CloakedU64::new(0);
}

#[test]
fn key_is_stable_and_init_is_rejected_afterwards() {
    let first = cloakint::keyring().expect("keyring");
    let _ = CloakedU64::new(1);
    let second = cloakint::keyring().expect("keyring");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(
        cloakint::init(&cloakint::CloakConfig::default()).unwrap_err(),
        CloakError::AlreadyInitialized
    );
}
