//! Properties of the SIC decoder over randomly built frames

use slotsim_core::{
    seeded_rng, FrameArena, PlrModel, PowerDistribution, PowerStrategy, Scheme, SicDecoder,
    SimulationParameters,
};

fn crdsa_params(plr_model: PlrModel) -> SimulationParameters {
    SimulationParameters::builder(Scheme::crdsa(2))
        .nslots(40)
        .power_distribution(PowerDistribution::log_uniform_db(0.0, 10.0).unwrap())
        .power_strategy(PowerStrategy::IndependentPower)
        .plr_model(plr_model)
        .build()
        .unwrap()
}

fn decoded_with_iterations(params: &SimulationParameters, seed: u64, nusers: usize) -> Vec<usize> {
    let mut arena = FrameArena::for_scheme(params.scheme(), params.ra_slots());
    let mut build_rng = seeded_rng(seed);
    let frame = arena
        .build(
            params.scheme(),
            params.power_strategy(),
            params.power_distribution(),
            nusers,
            &mut build_rng,
        )
        .unwrap();

    (1..=15)
        .map(|iterations| {
            let mut decoder = SicDecoder::new(params).with_iterations(iterations);
            decoder.decode(&frame, &mut seeded_rng(seed + 1_000))
        })
        .collect()
}

#[test]
fn more_iterations_never_decode_fewer_users() {
    let params = crdsa_params(PlrModel::Collision);
    for seed in 0..30 {
        let counts = decoded_with_iterations(&params, seed, 30);
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "seed {seed}: {counts:?}");
        }
        assert!(counts.iter().all(|&c| c <= 30));
    }
}

#[test]
fn probabilistic_decoding_is_monotone_for_a_fixed_draw_sequence() {
    let params = crdsa_params(PlrModel::Curve(
        slotsim_core::PlrCurve::default_for(1.0 / 3.0, 4).unwrap(),
    ));
    for seed in 0..30 {
        let counts = decoded_with_iterations(&params, seed, 25);
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "seed {seed}: {counts:?}");
        }
    }
}

#[test]
fn empty_frame_decodes_nothing() {
    let params = crdsa_params(PlrModel::Collision);
    let counts = decoded_with_iterations(&params, 0, 0);
    assert!(counts.iter().all(|&c| c == 0));
}

#[test]
fn lone_user_always_decodes_under_collision_model() {
    let params = crdsa_params(PlrModel::Collision);
    for seed in 0..10 {
        assert_eq!(decoded_with_iterations(&params, seed, 1)[0], 1);
    }
}
