use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;

/// Describes one layer in a network architecture.
///
/// Fields:
/// - `neurons`    — number of neurons in this layer
/// - `activation` — activation applied to this layer's pre-activations
///                  (the input layer uses `Identity`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub neurons: usize,
    pub activation: Activation,
}

impl LayerSpec {
    pub fn new(neurons: usize, activation: Activation) -> LayerSpec {
        LayerSpec { neurons, activation }
    }
}

/// A fully serializable description of a network architecture plus its
/// training hyperparameters.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights, making it possible to store architecture configurations
/// before training starts. Note that trained weights themselves use the raw
/// binary format of `Network::save`, not JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable identifier for the architecture.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Global learning rate applied by the weight update.
    pub learning_rate: f32,
    /// Worker threads for the pooled paths; 0 disables pooling.
    #[serde(default)]
    pub workers: usize,
}

impl NetworkSpec {
    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
