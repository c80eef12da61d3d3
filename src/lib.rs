pub mod math;
pub mod activation;
pub mod layers;
pub mod pool;
pub mod network;
pub mod loss;
pub mod train;

// Convenience re-exports
pub use math::tensor::{Tensor, Tensor1, Tensor2, Tensor3, TensorView, TensorViewMut};
pub use activation::activation::Activation;
pub use layers::dense::Layer;
pub use pool::worker_pool::WorkerPool;
pub use network::network::Network;
pub use network::sample::TrainingSample;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use loss::mse::MseLoss;
pub use train::loop_fn::train_loop;
pub use train::train_config::TrainConfig;
pub use train::epoch_stats::EpochStats;
