//! End-to-end measurement statistics against random density operators

use mparray_core::{LocalTensorOps, MPArray};
use mparray_povm::{LocalPovm, MPPovm, PovmError};
use mparray_random::{random_mpdo, random_mps};
use num_complex::Complex64;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn two_outcome_device_on_random_mpdo() {
    let mut rng = ChaCha8Rng::seed_from_u64(3208886881);
    let rho = random_mpdo(&mut rng, 4, 2, 3).unwrap();
    let device = MPPovm::from_local_povm(&LocalPovm::z_povm(2).unwrap(), 2).unwrap();

    let windows: Vec<MPArray<Complex64>> = device
        .expectations(&rho)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    // 4 host sites, width 2: exactly 3 windows
    assert_eq!(windows.len(), 3);
    for probs in &windows {
        let arr = probs.to_array();
        assert_eq!(arr.data().len(), 4);
        let mut total = Complex64::new(0.0, 0.0);
        for &p in arr.data() {
            // Outcome probabilities are real and nonnegative
            assert!(p.im.abs() < 1e-10);
            assert!(p.re > -1e-10);
            total += p;
        }
        assert!((total - 1.0).norm() < 1e-10);
    }
}

#[test]
fn pauli_device_probabilities_are_normalized() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let rho = random_mpdo(&mut rng, 3, 2, 2).unwrap();
    let device = MPPovm::from_local_povm(&LocalPovm::pauli_povm().unwrap(), 1).unwrap();

    let windows: Vec<MPArray<Complex64>> = device
        .expectations(&rho)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(windows.len(), 3);
    for probs in &windows {
        assert!((probs.sum() - 1.0).norm() < 1e-10);
    }
}

#[test]
fn early_stop_consumes_only_a_prefix() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let rho = random_mpdo(&mut rng, 5, 2, 2).unwrap();
    let device = MPPovm::from_local_povm(&LocalPovm::z_povm(2).unwrap(), 2).unwrap();

    let mut it = device.expectations(&rho).unwrap();
    let first = it.next().unwrap().unwrap();
    assert!((first.sum() - 1.0).norm() < 1e-10);
    drop(it);

    // The sequence is not restartable but can be re-derived
    let again: Vec<_> = device
        .expectations(&rho)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(again.len(), 4);
}

#[test]
fn pure_state_hosts_are_reported_as_unsupported() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let psi = random_mps(&mut rng, 4, 2, 2, false).unwrap();
    let device = MPPovm::from_local_povm(&LocalPovm::z_povm(2).unwrap(), 2).unwrap();

    match device.expectations(&psi) {
        Err(PovmError::NotSupported { .. }) => {}
        other => panic!("expected NotSupported, got {:?}", other.map(|_| ())),
    }
}
