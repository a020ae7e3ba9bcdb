//! RetroGrad: a minimal reverse-mode automatic-differentiation engine.
//!
//! Forward evaluation records every traced operator into an arena of
//! operation records owned by a [`Graph`]; [`Value`] handles are integer
//! indices into that arena. [`Value::backward`] orders the recorded subgraph
//! reverse-topologically and accumulates gradients into the leaves via each
//! record's local gradient rule.

// Déclare les modules principaux de la crate
pub mod error;
pub mod graph;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod types;
pub mod utils;
pub mod value;

// Ré-exporte les types de base pour un accès direct via `retrograd_core::...`
pub use error::RetroGradError;
pub use graph::{Graph, OpId, ValueId};
pub use types::RetroNumeric;
pub use value::Value;

// Re-export traits required by public functions/structs
pub use num_traits;
