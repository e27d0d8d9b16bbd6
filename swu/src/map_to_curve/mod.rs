//! Simplified SWU map onto the isogenous curve `E': y^2 = x^3 + A * x + B`.
//!
//! Both maps are split in two phases. [`MapToCurveG1::candidate`] computes the
//! tuple `(g1x, div, num_x1, zeta_u2)` without any case split. The caller then
//! decides off-circuit whether `g1x` is a square and finalises with exactly one
//! of `finalize_quadratic` or `finalize_non_quadratic`. Picking the wrong one
//! leaves the circuit without a satisfying witness.
//!
//! Following the "avoiding inversions" form of [WB2019, section 4.2]:
//!
//! ```text
//!  zeta_u2 = Z * u^2
//!  t       = zeta_u2^2 + zeta_u2
//!  num_x1  = B * (t + 1)
//!  div     = A * (t == 0 ? Z : -t)
//!  g1x     = [(num_x1^2 + A * div^2) * num_x1 + B * div^3] / div^3
//! ```
//!
//! The output is a point on `E'`. Mapping it through the isogeny to the
//! target curve is left to the caller.

mod g1;
mod g2;

pub use g1::MapToCurveG1;
pub use g2::MapToCurveG2;

use ark_ec::short_weierstrass::{Affine, SWCurveConfig};
use ark_ff::{Field, PrimeField, QuadExtConfig, QuadExtField};
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::SynthesisError;

use crate::{
    circuit::FieldElement,
    fields::{fp2_is_square, Fp2Element},
};

/// Off-circuit decision on whether `g1x` is a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Residuosity {
    Residue,
    NonResidue,
}

impl Residuosity {
    /// Classify `value`. Zero is treated as a residue.
    pub fn of<F: Field>(value: &F) -> Self {
        if value.legendre().is_qnr() {
            Self::NonResidue
        } else {
            Self::Residue
        }
    }

    /// Classify `c0 + c1 * i` in `Fp[i] / (i^2 + 1)`.
    pub fn of_fp2<F: PrimeField>(value: [F; 2]) -> Self {
        if fp2_is_square(value) {
            Self::Residue
        } else {
            Self::NonResidue
        }
    }
}

/// SWU constants interned in a build by `set_consts`.
#[derive(Clone, Debug)]
pub struct SwuConstants<E> {
    pub a: E,
    pub b: E,
    pub z: E,
    pub one: E,
    pub zero: E,
}

/// Output of the first phase, consumed by exactly one finalisation.
#[derive(Clone, Debug)]
pub struct Candidate<E> {
    pub g1x: E,
    pub div: E,
    pub num_x1: E,
    pub zeta_u2: E,
}

/// Affine point on `E'`.
#[derive(Clone, Debug)]
pub struct AffinePoint<E> {
    pub x: E,
    pub y: E,
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> AffinePoint<FieldElement<F, CF, FP>> {
    /// Assigned coordinates as a point of `P`. The point is not checked to be
    /// on the curve.
    pub fn value<P: SWCurveConfig<BaseField = F>>(&self) -> Result<Affine<P>, SynthesisError> {
        Ok(Affine::new_unchecked(self.x.value()?, self.y.value()?))
    }
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> AffinePoint<Fp2Element<F, CF, FP>> {
    /// Assigned coordinates as a point of `P` over a quadratic extension of
    /// `F`. The point is not checked to be on the curve.
    pub fn value<P, Q>(&self) -> Result<Affine<P>, SynthesisError>
    where
        P: SWCurveConfig<BaseField = QuadExtField<Q>>,
        Q: QuadExtConfig<BaseField = F>,
    {
        Ok(Affine::new_unchecked(
            self.x.value_as()?,
            self.y.value_as()?,
        ))
    }
}
