use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activation::activation::Activation;
use crate::layers::dense::Layer;
use crate::loss::mse::MseLoss;
use crate::math::tensor::{linear_offset, Tensor1, Tensor2, Tensor3};
use crate::network::sample::TrainingSample;
use crate::network::spec::{LayerSpec, NetworkSpec};
use crate::pool::worker_pool::WorkerPool;

/// Raw buffer bases of one layer, handed to pool workers for the duration
/// of one dispatch.
///
/// Safety contract: repeats of a dispatch touch disjoint neuron/slot
/// cells, weights and biases stay read-only until the single-threaded
/// update, and the caller blocks on `WorkerPool::wait` before the layers
/// are borrowed again. Workers only ever form references to the individual
/// cells a repeat owns, never to a layer or the network as a whole.
#[derive(Clone, Copy)]
struct LayerCells {
    size: usize,
    output_size: usize,
    slots: usize,
    activation: Activation,
    weights: *const f32,
    biases: *const f32,
    inputs: *mut f32,
    outputs: *mut f32,
    errors: *mut f32,
    error_sums: *mut f32,
    weight_error_sums: *mut f32,
}

unsafe impl Send for LayerCells {}
unsafe impl Sync for LayerCells {}

impl LayerCells {
    /// Cell of a per-slot working buffer (`inputs`, `outputs`, `errors`, or
    /// `error_sums`) for one neuron in one slot.
    #[inline]
    unsafe fn cell(&self, base: *mut f32, neuron: usize, slot: usize) -> *mut f32 {
        base.add(linear_offset(&[self.size, self.slots], &[neuron, slot]))
    }

    /// Weight from this layer's neuron `from` to the next layer's `to`.
    #[inline]
    unsafe fn weight(&self, from: usize, to: usize) -> f32 {
        *self
            .weights
            .add(linear_offset(&[self.size, self.output_size], &[from, to]))
    }

    #[inline]
    unsafe fn weight_sum_cell(&self, from: usize, to: usize, slot: usize) -> *mut f32 {
        self.weight_error_sums.add(linear_offset(
            &[self.size, self.output_size, self.slots],
            &[from, to, slot],
        ))
    }
}

/// The whole layer stack as raw cell bases. The forward and backward
/// arithmetic lives here so the sequential and pooled paths run the same
/// code; [`Network`] derives a fresh `NetCells` per call and upholds the
/// [`LayerCells`] contract for its lifetime.
#[derive(Clone)]
struct NetCells {
    layers: Vec<LayerCells>,
}

impl NetCells {
    fn from_layers(layers: &mut [Layer]) -> NetCells {
        let layers = layers
            .iter_mut()
            .map(|layer| LayerCells {
                size: layer.size,
                output_size: layer.output_size,
                slots: layer.inputs.dims()[1],
                activation: layer.activation,
                weights: layer.weights.as_slice().as_ptr(),
                biases: layer.biases.as_slice().as_ptr(),
                inputs: layer.inputs.as_mut_slice().as_mut_ptr(),
                outputs: layer.outputs.as_mut_slice().as_mut_ptr(),
                errors: layer.errors.as_mut_slice().as_mut_ptr(),
                error_sums: layer.error_sums.as_mut_slice().as_mut_ptr(),
                weight_error_sums: layer.weight_error_sums.as_mut_slice().as_mut_ptr(),
            })
            .collect();
        NetCells { layers }
    }

    /// Computes one neuron's pre-activation and activation from the
    /// previous layer's outputs for `slot`.
    ///
    /// # Safety
    /// No other thread may write this neuron's cells in `slot` or the
    /// previous layer's outputs for `slot` while this runs.
    unsafe fn forward_neuron(&self, layer: usize, slot: usize, neuron: usize) {
        let prev = self.layers[layer - 1];
        let cur = self.layers[layer];

        let mut sum = *cur.biases.add(neuron);
        for j in 0..prev.size {
            sum += *prev.cell(prev.outputs, j, slot) * prev.weight(j, neuron);
        }
        *cur.cell(cur.inputs, neuron, slot) = sum;
        *cur.cell(cur.outputs, neuron, slot) = cur.activation.function(sum);
    }

    /// # Safety
    /// Requires exclusive access to every layer's cells for `slot`.
    unsafe fn forward(&self, slot: usize) {
        for layer in 1..self.layers.len() {
            for neuron in 0..self.layers[layer].size {
                self.forward_neuron(layer, slot, neuron);
            }
        }
    }

    /// Backpropagates the output error for one slot, accumulating bias and
    /// weight gradient sums into the slot's accumulators.
    ///
    /// The objective is squared error: the output delta is
    /// `(target − output) · act'(pre)`, hidden deltas fold each neuron's
    /// fan-out errors back through its outgoing weights.
    ///
    /// # Safety
    /// Requires exclusive access to every layer's cells for `slot`.
    unsafe fn backward(&self, targets: &[f32], slot: usize) {
        let last = self.layers.len() - 1;

        // Output layer deltas, plus gradient sums on the feeding layer.
        let prev = self.layers[last - 1];
        let out = self.layers[last];
        for n in 0..out.size {
            let pre = *out.cell(out.inputs, n, slot);
            let delta =
                (targets[n] - *out.cell(out.outputs, n, slot)) * out.activation.derivative(pre);
            *out.cell(out.errors, n, slot) = delta;
            *out.cell(out.error_sums, n, slot) += delta;
            for j in 0..prev.size {
                *prev.weight_sum_cell(j, n, slot) += delta * *prev.cell(prev.outputs, j, slot);
            }
        }

        // Hidden layers, walking backwards; layer 0 receives no deltas.
        for layer in (1..last).rev() {
            let prev = self.layers[layer - 1];
            let cur = self.layers[layer];
            let next = self.layers[layer + 1];

            for n in 0..cur.size {
                let mut folded = 0.0;
                for k in 0..next.size {
                    folded += *next.cell(next.errors, k, slot) * cur.weight(n, k);
                }
                let delta = folded * cur.activation.derivative(*cur.cell(cur.inputs, n, slot));
                *cur.cell(cur.errors, n, slot) = delta;
                *cur.cell(cur.error_sums, n, slot) += delta;
                for j in 0..prev.size {
                    *prev.weight_sum_cell(j, n, slot) += delta * *prev.cell(prev.outputs, j, slot);
                }
            }
        }
    }

    /// # Safety
    /// Requires exclusive access to every layer's cells for `slot`.
    unsafe fn train_slot(&self, sample: &TrainingSample, slot: usize) {
        let first = self.layers[0];
        assert_eq!(
            sample.inputs.len(),
            first.size,
            "input vector does not match the input layer size"
        );
        assert_eq!(
            sample.targets.len(),
            self.layers[self.layers.len() - 1].size,
            "target vector does not match the output layer size"
        );
        for (n, &value) in sample.inputs.iter().enumerate() {
            *first.cell(first.inputs, n, slot) = value;
            *first.cell(first.outputs, n, slot) = value;
        }
        self.forward(slot);
        self.backward(&sample.targets, slot);
    }
}

/// Raw pointer to the first sample of a batch dispatch; the `wait` barrier
/// bounds its use the same way as [`LayerCells`].
#[derive(Clone, Copy)]
struct SharedSamples(*const TrainingSample);

unsafe impl Send for SharedSamples {}
unsafe impl Sync for SharedSamples {}

/// A feedforward network: an ordered stack of fully-connected layers
/// trained by mini-batch gradient descent with a single global learning
/// rate.
///
/// Several samples can be in flight at once, each owning one *batch slot*
/// (a column of every layer's working buffers). Per-slot gradient sums are
/// accumulated during backpropagation and reduced across slots by the
/// single-threaded [`Network::update`], so concurrent samples never
/// contend on shared state.
pub struct Network {
    pub layers: Vec<Layer>,
    learning_rate: f32,
    slots: usize,
    pool: Option<WorkerPool>,
}

impl Network {
    /// Builds a network from layer descriptors (input → output, at least
    /// two). `workers` threads parallelize the pooled paths; 0 disables
    /// pooling and leaves a single batch slot.
    pub fn new(specs: &[LayerSpec], workers: usize) -> Network {
        Network::build(specs, workers, StdRng::from_entropy())
    }

    /// Like [`Network::new`] but with a fixed seed for the weight/bias
    /// initialization, so two networks built with the same seed start
    /// bit-identical.
    pub fn with_seed(specs: &[LayerSpec], workers: usize, seed: u64) -> Network {
        Network::build(specs, workers, StdRng::seed_from_u64(seed))
    }

    /// Builds a network from a serialized architecture description.
    pub fn from_spec(spec: &NetworkSpec) -> Network {
        let mut network = Network::new(&spec.layers, spec.workers);
        network.set_learning_rate(spec.learning_rate);
        network
    }

    fn build(specs: &[LayerSpec], workers: usize, mut rng: StdRng) -> Network {
        assert!(
            specs.len() >= 2,
            "a network needs at least an input and an output layer"
        );

        let slots = workers.max(1);
        let layers = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let output_size = specs.get(i + 1).map_or(0, |next| next.neurons);
                Layer::new(spec.neurons, spec.activation, output_size, slots, &mut rng)
            })
            .collect();
        let pool = (workers > 0).then(|| WorkerPool::new(workers));

        Network {
            layers,
            learning_rate: 0.1,
            slots,
            pool,
        }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    /// Number of batch slots (= worker count when pooled, else 1).
    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Copies the output layer's activations for one slot.
    pub fn outputs(&self, slot: usize) -> Vec<f32> {
        let last = self.output_layer();
        (0..last.size).map(|n| last.outputs[[n, slot]]).collect()
    }

    /// Copies `inputs` verbatim into layer 0's input *and* output columns
    /// for `slot`; the input layer applies no activation.
    pub fn load_inputs(&mut self, inputs: &[f32], slot: usize) {
        let first = &mut self.layers[0];
        assert_eq!(
            inputs.len(),
            first.size,
            "input vector does not match the input layer size"
        );
        for (n, &value) in inputs.iter().enumerate() {
            first.inputs[[n, slot]] = value;
            first.outputs[[n, slot]] = value;
        }
    }

    /// Sequential forward propagation for one slot.
    pub fn forward(&mut self, slot: usize) {
        let cells = NetCells::from_layers(&mut self.layers);
        // Single-threaded call: this thread is the sole user of the cells.
        unsafe { cells.forward(slot) };
    }

    /// Forward propagation with the per-neuron inner loop spread across the
    /// worker pool. Layers are still strictly sequential: each one is
    /// submitted as a single job and awaited before the next, since its
    /// pre-activations depend on the previous layer's outputs.
    ///
    /// Falls back to the sequential path when the network has no pool.
    pub fn forward_pooled(&mut self, slot: usize) {
        let cells = NetCells::from_layers(&mut self.layers);
        let Some(pool) = self.pool.as_ref() else {
            unsafe { cells.forward(slot) };
            return;
        };

        for layer in 1..cells.layers.len() {
            let neurons = cells.layers[layer].size;
            let job_cells = cells.clone();
            pool.submit(
                move |neuron| {
                    // Repeats of this job write disjoint neurons of one
                    // layer; the wait below keeps the bases in bounds.
                    unsafe { job_cells.forward_neuron(layer, slot, neuron) };
                },
                neurons,
            );
            pool.wait();
        }
    }

    /// Backpropagates the output error for one slot, accumulating bias and
    /// weight gradient sums into the slot's accumulators. See
    /// [`NetCells::backward`] for the delta equations.
    pub fn backward(&mut self, targets: &[f32], slot: usize) {
        let last = self.layers.len() - 1;
        assert_eq!(
            targets.len(),
            self.layers[last].size,
            "target vector does not match the output layer size"
        );
        let cells = NetCells::from_layers(&mut self.layers);
        // Single-threaded call: this thread is the sole user of the cells.
        unsafe { cells.backward(targets, slot) };
    }

    /// Applies the accumulated gradients: every weight moves by
    /// `learning_rate × Σ_slots weight_error_sum` and every bias by
    /// `learning_rate × Σ_slots error_sum`.
    ///
    /// The sums are intentionally not divided by the batch size; the
    /// learning rate absorbs that scale. Must not overlap with any
    /// forward/backward on the same network; the caller sequences this.
    pub fn update(&mut self) {
        let slots = self.slots;
        for layer in 1..self.layers.len() {
            let (front, back) = self.layers.split_at_mut(layer);
            let prev = &mut front[layer - 1];
            let cur = &mut back[0];

            for n in 0..cur.size {
                for j in 0..prev.size {
                    let mut sum = 0.0;
                    for slot in 0..slots {
                        sum += prev.weight_error_sums[[j, n, slot]];
                    }
                    prev.weights[[j, n]] += self.learning_rate * sum;
                }
                let mut sum = 0.0;
                for slot in 0..slots {
                    sum += cur.error_sums[[n, slot]];
                }
                cur.biases[[n]] += self.learning_rate * sum;
            }
        }
    }

    /// Zeroes every gradient accumulator in every slot.
    pub fn reset(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.reset_accumulators();
        }
    }

    /// Load + forward + backward for one sample in one slot, without
    /// touching the weights.
    fn train_slot(&mut self, sample: &TrainingSample, slot: usize) {
        self.load_inputs(&sample.inputs, slot);
        self.forward(slot);
        self.backward(&sample.targets, slot);
    }

    /// Trains on a single sample in `slot`; when `end_of_batch` is set,
    /// applies the accumulated gradients and resets the accumulators.
    pub fn train_one(&mut self, sample: &TrainingSample, end_of_batch: bool, slot: usize) {
        self.train_slot(sample, slot);
        if end_of_batch {
            self.update();
            self.reset();
        }
    }

    /// Trains on a whole mini-batch, then applies a single update and
    /// resets the accumulators. Returns the mean per-sample error measured
    /// after propagation (before the update).
    ///
    /// When pooled, the batch is one job whose claimed repeat index is both
    /// the batch slot and the sample index, so samples propagate
    /// concurrently into disjoint buffers; unpooled, every sample runs
    /// sequentially through slot 0.
    ///
    /// # Panics
    /// Panics when a pooled batch holds more samples than there are slots.
    pub fn train_batch(&mut self, samples: &[TrainingSample]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let total = if self.pool.is_some() {
            self.train_batch_pooled(samples)
        } else {
            self.train_batch_serial(samples)
        };

        self.update();
        self.reset();
        total / samples.len() as f32
    }

    fn train_batch_serial(&mut self, samples: &[TrainingSample]) -> f32 {
        let mut total = 0.0;
        for sample in samples {
            self.train_slot(sample, 0);
            total += self.error(sample, 0);
        }
        total
    }

    fn train_batch_pooled(&mut self, samples: &[TrainingSample]) -> f32 {
        assert!(
            samples.len() <= self.slots,
            "batch of {} samples exceeds {} batch slots",
            samples.len(),
            self.slots
        );

        let cells = NetCells::from_layers(&mut self.layers);
        let Some(pool) = self.pool.as_ref() else {
            return self.train_batch_serial(samples);
        };

        let data = SharedSamples(samples.as_ptr());
        pool.submit(
            move |slot| {
                // Capture the whole `SharedSamples` wrapper (not just its
                // pointer field) so its Send/Sync impls apply.
                let data = &data;
                // Each repeat propagates one sample through its own slot's
                // cells; the wait below keeps the bases in bounds.
                let sample = unsafe { &*data.0.add(slot) };
                unsafe { cells.train_slot(sample, slot) };
            },
            samples.len(),
        );
        pool.wait();

        samples
            .iter()
            .enumerate()
            .map(|(slot, sample)| self.error(sample, slot))
            .sum()
    }

    /// Forward-only inference: loads `inputs`, propagates, and returns the
    /// output layer's activations for `slot`.
    pub fn predict(&mut self, inputs: &[f32], slot: usize) -> Vec<f32> {
        self.load_inputs(inputs, slot);
        self.forward_pooled(slot);
        self.outputs(slot)
    }

    /// Mean squared difference between the output layer's stored outputs
    /// for `slot` and the sample's targets, averaged over output neurons.
    pub fn error(&self, sample: &TrainingSample, slot: usize) -> f32 {
        MseLoss::loss(&self.outputs(slot), &sample.targets)
    }

    /// Serializes layer dimensions, biases, and weights to `path` in a raw
    /// native-endian binary layout (no magic number, no version field):
    /// layer count, then per layer its neuron count, per-neuron weight
    /// count, and each neuron's bias followed by its outgoing weights.
    pub fn save(&self, path: &str) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&(self.layers.len() as i32).to_ne_bytes())?;
        for layer in &self.layers {
            writer.write_all(&(layer.size as i32).to_ne_bytes())?;
            writer.write_all(&(layer.output_size as i32).to_ne_bytes())?;
            for n in 0..layer.size {
                writer.write_all(&layer.biases[[n]].to_ne_bytes())?;
                for j in 0..layer.output_size {
                    writer.write_all(&layer.weights[[n, j]].to_ne_bytes())?;
                }
            }
        }
        writer.flush()?;

        info!("saved {} layers to {path}", self.layers.len());
        Ok(())
    }

    /// Replaces the layer set with the contents of a file written by
    /// [`Network::save`].
    ///
    /// The file carries no activation kinds, so layer 0 is restored as
    /// `Identity` and every later layer as `Sigmoid`; the learning rate and
    /// slot count are kept as-is. Layers are swapped in as they parse, so a
    /// malformed file can leave a partially replaced layer set behind.
    pub fn load(&mut self, path: &str) -> io::Result<()> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let layer_count = read_dim(&mut reader)?;
        self.layers.clear();

        for i in 0..layer_count {
            let size = read_dim(&mut reader)?;
            let output_size = read_dim(&mut reader)?;
            let activation = if i == 0 {
                Activation::Identity
            } else {
                Activation::Sigmoid
            };

            let mut layer = Layer {
                size,
                output_size,
                activation,
                weights: Tensor2::new([size, output_size]),
                biases: Tensor1::new([size]),
                inputs: Tensor2::new([size, self.slots]),
                outputs: Tensor2::new([size, self.slots]),
                errors: Tensor2::new([size, self.slots]),
                error_sums: Tensor2::new([size, self.slots]),
                weight_error_sums: Tensor3::new([size, output_size, self.slots]),
            };
            for n in 0..size {
                layer.biases[[n]] = read_f32(&mut reader)?;
                for j in 0..output_size {
                    layer.weights[[n, j]] = read_f32(&mut reader)?;
                }
            }
            self.layers.push(layer);
        }

        info!("loaded {layer_count} layers from {path}");
        Ok(())
    }
}

fn read_dim(reader: &mut impl Read) -> io::Result<usize> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    let value = i32::from_ne_bytes(buf);
    if value < 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("negative dimension {value} in model file"),
        ));
    }
    Ok(value as usize)
}

fn read_f32(reader: &mut impl Read) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_ne_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigmoid_stack(workers: usize, seed: u64) -> Network {
        Network::with_seed(
            &[
                LayerSpec::new(2, Activation::Identity),
                LayerSpec::new(3, Activation::Sigmoid),
                LayerSpec::new(1, Activation::Sigmoid),
            ],
            workers,
            seed,
        )
    }

    #[test]
    fn same_seed_builds_identical_networks() {
        let a = sigmoid_stack(0, 11);
        let b = sigmoid_stack(0, 11);
        for (la, lb) in a.layers.iter().zip(b.layers.iter()) {
            assert_eq!(la.weights, lb.weights);
            assert_eq!(la.biases, lb.biases);
        }
    }

    #[test]
    fn load_inputs_copies_verbatim() {
        let mut net = sigmoid_stack(0, 1);
        net.load_inputs(&[0.25, -0.5], 0);
        assert_eq!(net.layers[0].inputs[[0, 0]], 0.25);
        assert_eq!(net.layers[0].outputs[[0, 0]], 0.25);
        assert_eq!(net.layers[0].inputs[[1, 0]], -0.5);
        assert_eq!(net.layers[0].outputs[[1, 0]], -0.5);
    }

    #[test]
    fn forward_is_deterministic() {
        let mut net = sigmoid_stack(0, 5);
        net.load_inputs(&[0.3, 0.7], 0);
        net.forward(0);
        let first = net.outputs(0);
        net.load_inputs(&[0.3, 0.7], 0);
        net.forward(0);
        let second = net.outputs(0);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn pooled_forward_matches_sequential() {
        let mut serial = sigmoid_stack(0, 5);
        let mut pooled = sigmoid_stack(2, 5);

        serial.load_inputs(&[0.3, 0.7], 0);
        serial.forward(0);
        pooled.load_inputs(&[0.3, 0.7], 0);
        pooled.forward_pooled(0);

        for (a, b) in serial.outputs(0).iter().zip(pooled.outputs(0).iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn pooled_batch_gradients_match_serial() {
        let samples = vec![
            TrainingSample::new(vec![0.0, 0.0], vec![0.0]),
            TrainingSample::new(vec![0.0, 1.0], vec![1.0]),
            TrainingSample::new(vec![1.0, 0.0], vec![1.0]),
            TrainingSample::new(vec![1.0, 1.0], vec![0.0]),
        ];
        let mut pooled = sigmoid_stack(4, 3);
        let mut serial = sigmoid_stack(0, 3);

        // Slot-order accumulator sums reduce in the same order as the
        // serial single-slot accumulation, so the updated parameters must
        // agree exactly.
        for _ in 0..10 {
            pooled.train_batch(&samples);
            serial.train_batch(&samples);
        }

        for (a, b) in pooled.layers.iter().zip(serial.layers.iter()) {
            for (wa, wb) in a.weights.as_slice().iter().zip(b.weights.as_slice().iter()) {
                assert_eq!(wa.to_bits(), wb.to_bits());
            }
            for (ba, bb) in a.biases.as_slice().iter().zip(b.biases.as_slice().iter()) {
                assert_eq!(ba.to_bits(), bb.to_bits());
            }
        }
    }

    #[test]
    fn error_metric_corner_cases() {
        let mut net = sigmoid_stack(0, 2);
        let sample = TrainingSample::new(vec![0.0, 0.0], vec![1.0]);

        let last = net.layers.len() - 1;
        net.layers[last].outputs[[0, 0]] = 1.0;
        assert_eq!(net.error(&sample, 0), 0.0);

        net.layers[last].outputs[[0, 0]] = 0.0;
        assert_eq!(net.error(&sample, 0), 1.0);
    }

    #[test]
    fn update_follows_hand_computed_gradient() {
        // 1-in/1-out identity network: every quantity is closed-form.
        let mut net = Network::with_seed(
            &[
                LayerSpec::new(1, Activation::Identity),
                LayerSpec::new(1, Activation::Identity),
            ],
            0,
            0,
        );
        net.set_learning_rate(0.5);
        net.layers[0].weights[[0, 0]] = 2.0;
        net.layers[1].biases[[0]] = 0.25;

        let x = 3.0;
        let target = 10.0;
        let sample = TrainingSample::new(vec![x], vec![target]);
        net.train_one(&sample, true, 0);

        // pre = b + w·x = 6.25, delta = target − pre = 3.75,
        // w += lr·delta·x, b += lr·delta.
        let delta = target - (0.25 + 2.0 * x);
        assert!((net.layers[0].weights[[0, 0]] - (2.0 + 0.5 * delta * x)).abs() < 1e-5);
        assert!((net.layers[1].biases[[0]] - (0.25 + 0.5 * delta)).abs() < 1e-5);

        // Accumulators are cleared at the batch boundary.
        assert_eq!(net.layers[0].weight_error_sums[[0, 0, 0]], 0.0);
        assert_eq!(net.layers[1].error_sums[[0, 0]], 0.0);
    }

    #[test]
    fn save_load_round_trip_is_bit_identical() {
        let trained = sigmoid_stack(0, 21);
        let path = std::env::temp_dir().join("dendrite_round_trip.dpn");
        let path = path.to_str().unwrap().to_string();
        trained.save(&path).unwrap();

        let mut restored = sigmoid_stack(0, 99);
        restored.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored.layers.len(), trained.layers.len());
        for (a, b) in restored.layers.iter().zip(trained.layers.iter()) {
            assert_eq!(a.size, b.size);
            assert_eq!(a.output_size, b.output_size);
            for (wa, wb) in a.weights.as_slice().iter().zip(b.weights.as_slice().iter()) {
                assert_eq!(wa.to_bits(), wb.to_bits());
            }
            for (ba, bb) in a.biases.as_slice().iter().zip(b.biases.as_slice().iter()) {
                assert_eq!(ba.to_bits(), bb.to_bits());
            }
        }

        // Activation kinds are not persisted: fixed defaults come back.
        assert_eq!(restored.layers[0].activation, Activation::Identity);
        assert_eq!(restored.layers[1].activation, Activation::Sigmoid);
        assert_eq!(restored.layers[2].activation, Activation::Sigmoid);
    }

    #[test]
    fn load_rejects_negative_dimensions() {
        let path = std::env::temp_dir().join("dendrite_bad_header.dpn");
        let path = path.to_str().unwrap().to_string();
        std::fs::write(&path, (-3i32).to_ne_bytes()).unwrap();

        let mut net = sigmoid_stack(0, 1);
        let err = net.load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn predict_runs_without_touching_weights() {
        let mut net = sigmoid_stack(2, 13);
        let before: Vec<f32> = net.layers[0].weights.as_slice().to_vec();
        let out = net.predict(&[1.0, 0.0], 0);
        assert_eq!(out.len(), 1);
        assert_eq!(net.layers[0].weights.as_slice(), before.as_slice());
    }
}
