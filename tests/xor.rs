use dendrite_nn::{train_loop, Activation, LayerSpec, Network, TrainConfig, TrainingSample};

fn xor_samples() -> Vec<TrainingSample> {
    vec![
        TrainingSample::new(vec![0.0, 0.0], vec![0.0]),
        TrainingSample::new(vec![0.0, 1.0], vec![1.0]),
        TrainingSample::new(vec![1.0, 0.0], vec![1.0]),
        TrainingSample::new(vec![1.0, 1.0], vec![0.0]),
    ]
}

fn xor_network(workers: usize, seed: u64) -> Network {
    let mut network = Network::with_seed(
        &[
            LayerSpec::new(2, Activation::Identity),
            LayerSpec::new(3, Activation::Sigmoid),
            LayerSpec::new(1, Activation::Sigmoid),
        ],
        workers,
        seed,
    );
    network.set_learning_rate(1.0);
    network
}

/// Trains the network for `epochs` passes over the XOR set and reports
/// whether every sample ends below 0.05 MSE and classifies within 0.5.
fn train_and_check(network: &mut Network, epochs: usize) -> bool {
    let samples = xor_samples();
    for _ in 0..epochs {
        for (i, sample) in samples.iter().enumerate() {
            network.train_one(sample, i == samples.len() - 1, 0);
        }
    }
    samples.iter().all(|sample| {
        let output = network.predict(&sample.inputs, 0);
        network.error(sample, 0) < 0.05 && (output[0] - sample.targets[0]).abs() < 0.5
    })
}

#[test]
fn xor_converges_with_per_sample_training() {
    // A small fraction of uniform inits lands in the 0.25-MSE trap, so an
    // alternate seed is accepted before calling the engine broken.
    let converged = [42, 1337]
        .iter()
        .any(|&seed| train_and_check(&mut xor_network(0, seed), 8000));
    assert!(converged, "XOR failed to converge for every tried seed");
}

#[test]
fn xor_converges_with_pooled_batches() {
    let samples = xor_samples();
    let config = TrainConfig::new(8000, samples.len());

    let converged = [42, 1337].iter().any(|&seed| {
        let mut network = xor_network(4, seed);
        let error = train_loop(&mut network, &samples, &config);
        error < 0.05
            && samples.iter().all(|sample| {
                let output = network.predict(&sample.inputs, 0);
                (output[0] - sample.targets[0]).abs() < 0.5
            })
    });
    assert!(converged, "XOR failed to converge for every tried seed");
}

/// A pooled `train_batch` of K samples and K sequential `train_one` calls
/// (update only at the end) accumulate the same per-sample gradient sums,
/// so the resulting weights must agree to float tolerance.
#[test]
fn batch_update_matches_sequential_accumulation() {
    let samples = xor_samples();

    let mut batched = xor_network(4, 7);
    let mut sequential = xor_network(0, 7);

    for _ in 0..25 {
        batched.train_batch(&samples);
        for (i, sample) in samples.iter().enumerate() {
            sequential.train_one(sample, i == samples.len() - 1, 0);
        }
    }

    for (a, b) in batched.layers.iter().zip(sequential.layers.iter()) {
        for (wa, wb) in a.weights.as_slice().iter().zip(b.weights.as_slice().iter()) {
            assert!(
                (wa - wb).abs() < 1e-4,
                "weights diverged: {wa} vs {wb}"
            );
        }
        for (ba, bb) in a.biases.as_slice().iter().zip(b.biases.as_slice().iter()) {
            assert!((ba - bb).abs() < 1e-4, "biases diverged: {ba} vs {bb}");
        }
    }
}

#[test]
fn trained_weights_survive_a_save_load_cycle() {
    let samples = xor_samples();
    let mut network = xor_network(0, 42);

    for _ in 0..8000 {
        for (i, sample) in samples.iter().enumerate() {
            network.train_one(sample, i == samples.len() - 1, 0);
        }
    }

    let path = std::env::temp_dir().join("dendrite_xor_trained.dpn");
    let path = path.to_str().unwrap().to_string();
    network.save(&path).unwrap();

    let mut restored = xor_network(0, 1);
    restored.load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    // The loaded network classifies XOR exactly like the trained one: the
    // fixed sigmoid default on load matches the trained activations here.
    for sample in &samples {
        let expected = network.predict(&sample.inputs, 0);
        let got = restored.predict(&sample.inputs, 0);
        assert_eq!(expected[0].to_bits(), got[0].to_bits());
    }
}
