// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end: configuration -> process-wide registry -> group and network runs

use parking_lot::{const_mutex, Mutex, MutexGuard};
use spikeflow::config::{parse_config, SpikeflowConfig};
use spikeflow::prelude::*;

static REGISTRY_GUARD: Mutex<()> = const_mutex(());

fn guarded(config: &str) -> (MutexGuard<'static, ()>, SpikeflowConfig) {
    let guard = REGISTRY_GUARD.lock();
    let config = parse_config(config).unwrap();
    spikeflow::init_from_config(&config).unwrap();
    (guard, config)
}

/// Integrate-and-fire with reset; spikes land in `spike`
fn integrate_and_fire() -> NeuType {
    NeuType::builder("iaf")
        .requires(StateTemplate::new([("v", 0.0), ("spike", 0.0), ("inp", 0.0)]).unwrap())
        .parameters(ParameterSet::new().with("v_th", 1.0))
        .step(StepFunction::new("fire", ["ST", "v_th"], |args| {
            let v_th = args.param_value("v_th")?;
            let st = args.state()?;
            let inp = st.var("inp")?.to_owned();
            let mut v = st.var_mut("v")?;
            v += &inp;
            let fired = v.mapv(|x| if x >= v_th { 1.0 } else { 0.0 });
            v.zip_mut_with(&fired, |x, s| {
                if *s > 0.0 {
                    *x = 0.0
                }
            });
            st.var_mut("spike")?.assign(&fired);
            st.set("inp", 0.0)?;
            Ok(())
        }))
        .build()
        .unwrap()
}

#[test]
fn test_config_drives_registry() {
    let (_guard, config) = guarded("[backend]\nname = \"jit\"\ndt = 0.5\n");
    assert_eq!(config.backend.name, "jit");
    assert_eq!(backend::get_backend(), BackendType::Jit);
    assert_eq!(backend::get_dt(), 0.5);

    let mut group =
        NeuGroup::new(&integrate_and_fire(), 4usize, GroupOptions::new().monitors(["v"])).unwrap();
    let mon = group.run(5.0, RunOptions::new()).unwrap();
    assert_eq!(mon.steps(), 10);
    assert_eq!(mon.ts()[1], 0.5);
}

#[test]
fn test_custom_backend_name_is_rejected_without_operators() {
    let _guard = REGISTRY_GUARD.lock();
    let config = parse_config("[backend]\nname = \"loihi\"\ndt = 0.1\n").unwrap();
    let err = spikeflow::init_from_config(&config).unwrap_err();
    assert!(matches!(err, SimError::UnknownBackend(ref n) if n == "loihi"));
}

#[test]
fn test_integer_dt_never_reaches_registry() {
    let _guard = REGISTRY_GUARD.lock();
    assert!(parse_config("[backend]\ndt = 1\n").is_err());
}

#[test]
fn test_network_spike_counts() {
    let (_guard, _) = guarded("[backend]\nname = \"array\"\ndt = 1.0\n");

    let model = integrate_and_fire();
    let fast = NeuGroup::new(
        &model,
        2usize,
        GroupOptions::new().name("fast").monitors(["spike"]),
    )
    .unwrap();
    let slow = NeuGroup::new(
        &model,
        2usize,
        GroupOptions::new().name("slow").monitors(["spike"]),
    )
    .unwrap();
    let mut net = Network::new().with(fast).unwrap().with(slow).unwrap();
    net.run(
        12.0,
        RunOptions::new()
            .input(Input::add("inp", 0.5).to("fast"))
            .input(Input::add("inp", 0.25).to("slow")),
    )
    .unwrap();

    let spikes = |name: &str| -> f64 {
        net.group(name)
            .and_then(NeuGroup::mon)
            .map(|mon| mon["spike"].sum())
            .unwrap()
    };
    // Two units each: every 2nd step vs every 4th step.
    assert_eq!(spikes("fast"), 12.0);
    assert_eq!(spikes("slow"), 6.0);
}

#[test]
fn test_switching_backend_keeps_existing_state() {
    let (_guard, _) = guarded("[backend]\nname = \"array\"\ndt = 1.0\n");
    let mut group = NeuGroup::new(&integrate_and_fire(), 3usize, GroupOptions::new()).unwrap();
    group.state_mut().set("v", 0.75).unwrap();

    backend::set(BackendType::Autodiff, BackendOptions::default()).unwrap();
    assert!(group.state().var("v").unwrap().iter().all(|v| *v == 0.75));
    assert_eq!(backend::get_dt(), 1.0);
}
