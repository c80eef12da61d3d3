pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²) over the output neurons.
    pub fn loss(predicted: &[f32], expected: &[f32]) -> f32 {
        assert_eq!(
            predicted.len(),
            expected.len(),
            "predicted and expected must have equal length"
        );
        let n = predicted.len() as f32;
        predicted
            .iter()
            .zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            / n
    }
}
