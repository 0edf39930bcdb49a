pub mod sidecar;
pub mod writer;
