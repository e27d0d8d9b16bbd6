use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

use crate::curves::CurveId;

#[derive(Error, Debug)]
pub enum MapToCurveError {
    #[error("unknown curve id {0}")]
    UnknownCurve(usize),

    #[error("field does not match the base field of {curve:?}")]
    ModulusMismatch { curve: CurveId },

    #[error("invalid constant in parameter table: {0}")]
    InvalidConstant(&'static str),

    #[error("SWU constants are not set, call `set_consts` first")]
    ConstantsNotSet,

    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}
