//! Function approximation on a coordinate grid: the network learns
//! (x, y) -> brightness for a smooth bump, training mini-batches in
//! parallel across a four-worker pool.

use dendrite_nn::{train_loop, Activation, LayerSpec, Network, TrainConfig, TrainingSample};

/// Target surface: a radial bump centered on the grid, in [0, 1].
fn brightness(x: f32, y: f32) -> f32 {
    let dx = x - 0.5;
    let dy = y - 0.5;
    (-8.0 * (dx * dx + dy * dy)).exp()
}

fn main() {
    env_logger::init();

    const GRID: usize = 16;
    const WORKERS: usize = 4;

    let mut samples = Vec::with_capacity(GRID * GRID);
    for gy in 0..GRID {
        for gx in 0..GRID {
            let x = gx as f32 / (GRID - 1) as f32;
            let y = gy as f32 / (GRID - 1) as f32;
            samples.push(TrainingSample::new(vec![x, y], vec![brightness(x, y)]));
        }
    }

    let mut network = Network::new(
        &[
            LayerSpec::new(2, Activation::Identity),
            LayerSpec::new(16, Activation::Sigmoid),
            LayerSpec::new(8, Activation::Sigmoid),
            LayerSpec::new(1, Activation::Sigmoid),
        ],
        WORKERS,
    );
    network.set_learning_rate(0.5);

    // Batch size matches the pool so every slot carries one sample.
    let config = TrainConfig::new(200, WORKERS);
    for round in 1..=10 {
        let error = train_loop(&mut network, &samples, &config);
        println!("Round {round:2}: error = {error:.6}");
    }

    // Render the learned surface as coarse ASCII shading.
    let shades = [' ', '.', ':', '+', '#'];
    for gy in 0..GRID {
        let mut line = String::with_capacity(GRID);
        for gx in 0..GRID {
            let x = gx as f32 / (GRID - 1) as f32;
            let y = gy as f32 / (GRID - 1) as f32;
            let value = network.predict(&[x, y], 0)[0];
            let shade = ((value * shades.len() as f32) as usize).min(shades.len() - 1);
            line.push(shades[shade]);
        }
        println!("{line}");
    }
}
