use rand::rngs::StdRng;

use crate::activation::activation::Activation;
use crate::math::tensor::{Tensor1, Tensor2, Tensor3};

/// One fully-connected layer of the network.
///
/// Weights are fan-out: `weights[[j, n]]` connects this layer's neuron `j`
/// to neuron `n` of the next layer, so the output layer has
/// `output_size == 0` and empty weight buffers. The per-slot tensors hold
/// one working column per concurrently trained sample (`slots` of them):
/// `inputs` stores pre-activations, `outputs` the activated values,
/// `errors` the backpropagated deltas, and the two `*_sums` tensors the
/// gradient accumulators consumed by the weight update.
#[derive(Debug)]
pub struct Layer {
    /// Neuron count.
    pub size: usize,
    /// Fan-out to the next layer; 0 for the output layer.
    pub output_size: usize,
    pub activation: Activation,

    pub weights: Tensor2,
    pub biases: Tensor1,

    pub inputs: Tensor2,
    pub outputs: Tensor2,
    pub errors: Tensor2,

    pub error_sums: Tensor2,
    pub weight_error_sums: Tensor3,
}

impl Layer {
    /// Builds a layer with weights and biases drawn uniformly from [-1, 1]
    /// and all per-slot buffers and accumulators zeroed.
    pub fn new(
        size: usize,
        activation: Activation,
        output_size: usize,
        slots: usize,
        rng: &mut StdRng,
    ) -> Layer {
        Layer {
            size,
            output_size,
            activation,
            weights: Tensor2::random([size, output_size], rng),
            biases: Tensor1::random([size], rng),
            inputs: Tensor2::new([size, slots]),
            outputs: Tensor2::new([size, slots]),
            errors: Tensor2::new([size, slots]),
            error_sums: Tensor2::new([size, slots]),
            weight_error_sums: Tensor3::new([size, output_size, slots]),
        }
    }

    /// Zeroes both gradient accumulators across every batch slot.
    pub fn reset_accumulators(&mut self) {
        self.error_sums.fill(0.0);
        self.weight_error_sums.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn construction_shapes_and_init() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Layer::new(4, Activation::Sigmoid, 3, 2, &mut rng);

        assert_eq!(layer.weights.dims(), [4, 3]);
        assert_eq!(layer.biases.dims(), [4]);
        assert_eq!(layer.outputs.dims(), [4, 2]);
        assert_eq!(layer.weight_error_sums.dims(), [4, 3, 2]);

        assert!(layer.weights.as_slice().iter().all(|&w| (-1.0..=1.0).contains(&w)));
        assert!(layer.error_sums.as_slice().iter().all(|&v| v == 0.0));
        assert!(layer.weight_error_sums.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn output_layer_has_no_outgoing_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Layer::new(5, Activation::Sigmoid, 0, 1, &mut rng);
        assert!(layer.weights.is_empty());
        assert!(layer.weight_error_sums.is_empty());
    }

    #[test]
    fn reset_clears_accumulators_only() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut layer = Layer::new(2, Activation::ReLU, 2, 1, &mut rng);
        layer.error_sums[[0, 0]] = 1.5;
        layer.weight_error_sums[[1, 1, 0]] = -2.0;
        let weights_before = layer.weights.clone();

        layer.reset_accumulators();

        assert!(layer.error_sums.as_slice().iter().all(|&v| v == 0.0));
        assert!(layer.weight_error_sums.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(layer.weights, weights_before);
    }
}
