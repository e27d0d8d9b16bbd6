#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::cast_precision_loss)]
#![deny(clippy::cast_sign_loss)]
#![deny(clippy::cast_lossless)]

pub mod bls12_381;
pub mod circuit;
pub mod curves;
pub mod error;
pub mod fields;
pub mod map_to_curve;

pub use circuit::{CompilationMode, ModuloCircuit};
pub use curves::CurveId;
pub use error::MapToCurveError;
pub use map_to_curve::{MapToCurveG1, MapToCurveG2, Residuosity};
