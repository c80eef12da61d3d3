use serde::{Deserialize, Serialize};

/// Per-layer activation kind.
///
/// `Identity` is the input layer's activation (inputs pass through
/// verbatim); the hidden and output layers typically use `Sigmoid`.
/// `LeakyReLU` uses a fixed negative slope of 0.01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Identity,
    Sigmoid,
    ReLU,
    LeakyReLU,
}

const LEAKY_SLOPE: f32 = 0.01;

impl Activation {
    /// Element-wise activation of a pre-activation value.
    pub fn function(&self, x: f32) -> f32 {
        match self {
            Activation::Identity => x,
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_SLOPE * x
                }
            }
        }
    }

    /// Closed-form derivative of the activation at a pre-activation value.
    ///
    /// The sigmoid derivative is expressed through the sigmoid's own output
    /// (`σ(x)·(1 − σ(x))`) so the exponential is evaluated once.
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            Activation::Identity => 1.0,
            Activation::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            Activation::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
        }
    }
}
