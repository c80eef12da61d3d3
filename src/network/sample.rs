use serde::{Deserialize, Serialize};

/// One training example: an input vector sized to the input layer and a
/// target vector sized to the output layer.
///
/// Raw values must already be normalized by the caller (e.g. byte
/// intensities scaled to [0, 1]) before the sample is handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    pub inputs: Vec<f32>,
    pub targets: Vec<f32>,
}

impl TrainingSample {
    pub fn new(inputs: Vec<f32>, targets: Vec<f32>) -> TrainingSample {
        TrainingSample { inputs, targets }
    }
}
