pub mod network;
pub mod sample;
pub mod spec;

pub use network::Network;
pub use sample::TrainingSample;
pub use spec::{LayerSpec, NetworkSpec};
