use solar_mgadsm::orbits::{OrbitalElements, Propagator, StateVector, UniversalPropagator};
use solar_mgadsm::solar_core::constants::{AU_KM, MU_SUN, SECONDS_PER_DAY};
use solar_mgadsm::solar_core::vector;

fn mars_like() -> OrbitalElements {
    OrbitalElements {
        semi_major_axis: 1.523_7 * AU_KM,
        eccentricity: 0.093_4,
        true_anomaly: 0.7,
        inclination: 1.85_f64.to_radians(),
        argument_of_periapsis: 286.5_f64.to_radians(),
        ascending_node: 49.56_f64.to_radians(),
    }
}

#[test]
fn heliocentric_coast_conserves_energy_and_momentum() {
    let propagator = UniversalPropagator::default();
    let start = mars_like().to_state(MU_SUN).unwrap();
    let energy = start.specific_energy(MU_SUN);
    let momentum = start.angular_momentum();

    for days in [1.0, 37.5, 400.0, 2_000.0, -250.0] {
        let out = propagator
            .propagate_state(&start, MU_SUN, days * SECONDS_PER_DAY)
            .unwrap();
        assert!(out.converged, "{days} d did not converge");
        let e = out.value.specific_energy(MU_SUN);
        assert!(
            ((e - energy) / energy).abs() < 1e-8,
            "{days} d: energy {e} vs {energy}"
        );
        let h = out.value.angular_momentum();
        assert!(
            vector::distance(&h, &momentum) < 1e-8 * vector::norm(&momentum),
            "{days} d: angular momentum drifted"
        );
    }
}

#[test]
fn element_and_cartesian_paths_agree_at_planet_scale() {
    let propagator = UniversalPropagator::default();
    let elements = mars_like();
    let dt = 321.0 * SECONDS_PER_DAY;

    let via_elements = propagator
        .propagate_elements(&elements, MU_SUN, dt)
        .unwrap()
        .value
        .to_state(MU_SUN)
        .unwrap();
    let via_state = propagator
        .propagate_state(&elements.to_state(MU_SUN).unwrap(), MU_SUN, dt)
        .unwrap()
        .value;

    let miss = vector::distance(&via_elements.position_km, &via_state.position_km);
    assert!(miss < 1.0, "position paths differ by {miss} km");
    let dv = vector::distance(&via_elements.velocity_km_s, &via_state.velocity_km_s);
    assert!(dv < 1e-6, "velocity paths differ by {dv} km/s");
}

#[test]
fn forward_then_backward_is_identity() {
    let propagator = UniversalPropagator::default();
    let start = StateVector::new([AU_KM, 0.0, 0.0], [0.0, 35.0, 2.0]);
    let dt = 180.0 * SECONDS_PER_DAY;
    let fwd = propagator.propagate_state(&start, MU_SUN, dt).unwrap();
    let back = propagator.propagate_state(&fwd.value, MU_SUN, -dt).unwrap();
    assert!(vector::distance(&back.value.position_km, &start.position_km) < 1.0);
    assert!(vector::distance(&back.value.velocity_km_s, &start.velocity_km_s) < 1e-7);
}

#[test]
fn near_parabolic_states_converge_both_ways() {
    const MU_EARTH: f64 = 398_600.441_8;
    let propagator = UniversalPropagator::default();
    let r0 = 7_000.0;
    let escape_speed = (2.0 * MU_EARTH / r0).sqrt();
    let dt = SECONDS_PER_DAY;

    for offset in [1e-6, -1e-6] {
        let start = StateVector::new([r0, 0.0, 0.0], [0.0, escape_speed + offset, 0.0]);
        let fwd = propagator.propagate_state(&start, MU_EARTH, dt).unwrap();
        assert!(fwd.converged, "v_esc {offset:+e}: forward used {} iterations", fwd.iterations);
        assert!(fwd.value.radius_km() > 2.0e5);

        let back = propagator
            .propagate_state(&fwd.value, MU_EARTH, -dt)
            .unwrap();
        assert!(back.converged, "v_esc {offset:+e}: backward used {} iterations", back.iterations);
        let miss = vector::distance(&back.value.position_km, &start.position_km);
        assert!(miss < 1e-3, "v_esc {offset:+e}: position off by {miss} km");
        let dv = vector::distance(&back.value.velocity_km_s, &start.velocity_km_s);
        assert!(dv < 1e-6, "v_esc {offset:+e}: velocity off by {dv} km/s");
    }
}
