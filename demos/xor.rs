use dendrite_nn::{Activation, LayerSpec, Network, TrainingSample};

fn main() {
    env_logger::init();

    let mut network = Network::new(
        &[
            LayerSpec::new(2, Activation::Identity),
            LayerSpec::new(3, Activation::Sigmoid),
            LayerSpec::new(1, Activation::Sigmoid),
        ],
        0,
    );
    network.set_learning_rate(1.0);

    let samples = [
        TrainingSample::new(vec![0.0, 0.0], vec![0.0]),
        TrainingSample::new(vec![0.0, 1.0], vec![1.0]),
        TrainingSample::new(vec![1.0, 0.0], vec![1.0]),
        TrainingSample::new(vec![1.0, 1.0], vec![0.0]),
    ];

    let mut error = 0.0;
    for iteration in 0..8000 {
        let sample = &samples[iteration % samples.len()];
        let end_of_batch = iteration % samples.len() == samples.len() - 1;
        network.train_one(sample, end_of_batch, 0);

        if iteration % 1000 < 4 {
            error += network.error(sample, 0);
            if iteration % 1000 == 3 {
                println!("Iteration {}: error = {:.6}", iteration + 1, error / 4.0);
                error = 0.0;
            }
        }
    }

    println!();
    for sample in &samples {
        let output = network.predict(&sample.inputs, 0);
        println!(
            "Input: {:?} -> Output: {:.4} (target {})",
            sample.inputs, output[0], sample.targets[0]
        );
    }
}
