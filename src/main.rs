// This binary crate is intentionally minimal.
// All training-engine logic lives in the library (src/lib.rs and its modules).
// Run demos with:
//   cargo run --example xor
//   cargo run --example approx
fn main() {
    env_logger::init();
    println!("dendrite-nn: a from-scratch batched neural network training engine in Rust.");
    println!("Run `cargo run --example xor` to see the XOR demo.");
}
