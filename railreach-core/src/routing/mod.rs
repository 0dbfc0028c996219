//! Travel-time propagation over the direct-time graph

pub mod propagation;

pub use propagation::propagate;
