#![no_main]

use libfuzzer_sys::fuzz_target;

use aerolab_core::{GeometryNormalizer, NormalizerOptions};

fuzz_target!(|data: &[u8]| {
    let normalizer = GeometryNormalizer::new(NormalizerOptions::default());

    // Should not panic
    let Ok(airfoil) = normalizer.normalize_bytes(data) else {
        return;
    };

    let options = normalizer.options();
    assert!(airfoil.len() >= options.min_points);
    assert!(airfoil.len() <= options.max_points);
    for pair in airfoil.points().windows(2) {
        assert!(!pair[0].coincides(&pair[1], options.epsilon));
    }

    // Rendering for the solver and reading it back must not panic either.
    let _ = normalizer.normalize(&airfoil.to_dat("FUZZ"));
});
