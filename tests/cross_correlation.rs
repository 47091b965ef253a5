//! Cross-correlation scaling between synthetic series pairs.

use fractal_scaling::{analyze_dcca, analyze_dfa, ScaleConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn white_noise(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen::<f64>() - 0.5).collect()
}

#[test]
fn dcca_of_series_with_itself_reproduces_dfa() {
    let series = white_noise(8192, 7);
    let config = ScaleConfig::default();
    let dfa = analyze_dfa(&series, &config).unwrap();
    let dcca = analyze_dcca(&series, &series, &config).unwrap();

    // Cross-covariance of a series with itself is its variance, so the
    // signed DCCA fluctuation table collapses onto the DFA table.
    assert_eq!(dfa.fluctuations.len(), dcca.fluctuations.len());
    for (&(s_a, f_a), &(s_b, f_b)) in dfa.fluctuations.iter().zip(&dcca.fluctuations) {
        assert_eq!(s_a, s_b);
        assert!(f_b > 0.0);
        assert!((f_a - f_b).abs() < 1e-10 * f_a.max(1.0));
    }
    assert!((dfa.hurst_exponent - dcca.exponent).abs() < 1e-10);
}

#[test]
fn rho_stays_within_unit_interval_for_random_pairs() {
    for seed in 0..20 {
        let a = white_noise(2048, 100 + seed);
        let b = white_noise(2048, 200 + seed);
        let dcca = analyze_dcca(&a, &b, &ScaleConfig::default()).unwrap();
        assert!(!dcca.rho.is_empty());
        for &(scale, rho) in &dcca.rho {
            assert!(
                (-1.0..=1.0).contains(&rho),
                "rho {} out of bounds at scale {} (seed {})",
                rho,
                scale,
                seed
            );
        }
    }
}

#[test]
fn independent_series_have_weak_cross_correlation() {
    let a = white_noise(8192, 300);
    let b = white_noise(8192, 301);
    let dcca = analyze_dcca(&a, &b, &ScaleConfig::default()).unwrap();

    // At small scales the window count is large and the coefficient
    // concentrates near zero for independent inputs.
    let (scale, rho) = dcca.rho[0];
    assert!(
        rho.abs() < 0.3,
        "independent series gave rho = {} at scale {}",
        rho,
        scale
    );
}

#[test]
fn shared_component_drives_rho_toward_one() {
    let common = white_noise(8192, 400);
    let mut rng = ChaCha8Rng::seed_from_u64(401);
    let a: Vec<f64> = common
        .iter()
        .map(|&x| x + 0.05 * (rng.gen::<f64>() - 0.5))
        .collect();
    let b: Vec<f64> = common
        .iter()
        .map(|&x| x + 0.05 * (rng.gen::<f64>() - 0.5))
        .collect();

    let dcca = analyze_dcca(&a, &b, &ScaleConfig::default()).unwrap();
    for &(scale, rho) in &dcca.rho {
        assert!(
            rho > 0.9,
            "strongly coupled series gave rho = {} at scale {}",
            rho,
            scale
        );
    }
    // Positive coupling keeps every signed fluctuation positive.
    assert!(dcca.fluctuations.iter().all(|&(_, f)| f > 0.0));
}
