//! Dense linear algebra seam for the inference engine.

pub mod algebra;

#[cfg(test)]
mod tests;

pub use algebra::{LinearSolver, LuSolver};
