use ark_ff::PrimeField;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::ConstraintSystemRef;

use super::{AffinePoint, Candidate, Residuosity, SwuConstants};
use crate::{
    circuit::{CompilationMode, FieldElement, ModuloCircuit},
    curves::{get_swu_params, CurveId, SwuParams},
    error::MapToCurveError,
};

type Element<F, CF, FP> = FieldElement<F, CF, FP>;

/// SWU map over the base field `F`.
pub struct MapToCurveG1<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> {
    circuit: ModuloCircuit<F, CF, FP>,
    params: SwuParams<F>,
    consts: Option<SwuConstants<Element<F, CF, FP>>>,
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> MapToCurveG1<F, CF, FP> {
    /// Fails with [`MapToCurveError::UnknownCurve`] if `curve_id` has no SWU
    /// parameters for `F`.
    pub fn new(
        name: &str,
        curve_id: CurveId,
        compilation_mode: CompilationMode,
    ) -> Result<Self, MapToCurveError> {
        let params = get_swu_params(curve_id)?;
        Ok(Self {
            circuit: ModuloCircuit::new(name, curve_id, compilation_mode),
            params,
            consts: None,
        })
    }

    pub fn from_cs(
        name: &str,
        curve_id: CurveId,
        cs: ConstraintSystemRef<CF>,
    ) -> Result<Self, MapToCurveError> {
        let params = get_swu_params(curve_id)?;
        Ok(Self {
            circuit: ModuloCircuit::from_cs(name, curve_id, cs),
            params,
            consts: None,
        })
    }

    pub fn circuit(&self) -> &ModuloCircuit<F, CF, FP> {
        &self.circuit
    }

    pub fn circuit_mut(&mut self) -> &mut ModuloCircuit<F, CF, FP> {
        &mut self.circuit
    }

    pub fn params(&self) -> &SwuParams<F> {
        &self.params
    }

    pub fn consts(&self) -> Option<&SwuConstants<Element<F, CF, FP>>> {
        self.consts.as_ref()
    }

    /// Intern `A`, `B`, `Z`, `1` and `0`. Must run before any map call.
    pub fn set_consts(&mut self) {
        let SwuParams { a, b, z } = self.params;
        let consts = SwuConstants {
            a: self.circuit.set_or_get_constant(a),
            b: self.circuit.set_or_get_constant(b),
            z: self.circuit.set_or_get_constant(z),
            one: self.circuit.set_or_get_constant(F::one()),
            zero: self.circuit.set_or_get_constant(F::zero()),
        };
        tracing::debug!(
            circuit = self.circuit.name(),
            curve_id = ?self.circuit.curve_id(),
            modulus_class = ?self.circuit.modulus_class(),
            "swu constants set"
        );
        self.consts = Some(consts);
    }

    pub fn write_element(&mut self, u: F) -> Result<Element<F, CF, FP>, MapToCurveError> {
        Ok(self.circuit.write_element(u)?)
    }

    fn constants(&self) -> Result<&SwuConstants<Element<F, CF, FP>>, MapToCurveError> {
        self.consts.as_ref().ok_or(MapToCurveError::ConstantsNotSet)
    }

    /// First phase, no case split.
    #[tracing::instrument(skip_all)]
    pub fn candidate(
        &mut self,
        u: &Element<F, CF, FP>,
    ) -> Result<Candidate<Element<F, CF, FP>>, MapToCurveError> {
        let c = self.constants()?.clone();
        let circuit = &mut self.circuit;

        let u2 = circuit.square(u)?;
        let zeta_u2 = circuit.mul(&c.z, &u2);
        let zeta_u2_sq = circuit.square(&zeta_u2)?;
        let t = circuit.add(&zeta_u2_sq, &zeta_u2);

        // t == 0 would make div vanish, substitute Z for -t
        let neg_t = circuit.neg(&t)?;
        let t_non_zero = circuit.is_non_zero(&neg_t)?;
        let neg_t_or_z = circuit.select(&t_non_zero, &neg_t, &c.z);

        let t_plus_one = circuit.add(&t, &c.one);
        let num_x1 = circuit.mul(&c.b, &t_plus_one);
        let div = circuit.mul(&c.a, &neg_t_or_z);

        let num_x1_sq = circuit.square(&num_x1)?;
        let div_sq = circuit.square(&div)?;
        let div_cu = circuit.mul(&div_sq, &div);
        let a_div_sq = circuit.mul(&c.a, &div_sq);
        let sum = circuit.add(&num_x1_sq, &a_div_sq);
        let num_gx1_head = circuit.mul(&sum, &num_x1);
        let b_div_cu = circuit.mul(&c.b, &div_cu);
        let num_gx1 = circuit.add(&num_gx1_head, &b_div_cu);
        let g1x = circuit.div(&num_gx1, &div_cu)?;

        tracing::info!(num_constraints = circuit.num_constraints());

        Ok(Candidate {
            g1x,
            div,
            num_x1,
            zeta_u2,
        })
    }

    /// Second phase when `g1x` is a square: `(num_x1 / div, sqrt(g1x))`.
    #[tracing::instrument(skip_all)]
    pub fn finalize_quadratic(
        &mut self,
        u: &Element<F, CF, FP>,
        candidate: Candidate<Element<F, CF, FP>>,
    ) -> Result<AffinePoint<Element<F, CF, FP>>, MapToCurveError> {
        self.constants()?;
        let circuit = &mut self.circuit;

        let y = circuit.sqrt(&candidate.g1x)?;
        let x = circuit.div(&candidate.num_x1, &candidate.div)?;
        let y = self.canonical_sign(u, &y)?;

        tracing::info!(num_constraints = self.circuit.num_constraints());

        Ok(AffinePoint { x, y })
    }

    /// Second phase when `g1x` is not a square. `Z * g1x` then is, and
    /// `g(Z * u^2 * x1) = (Z * u^3)^2 * Z * g1x`.
    #[tracing::instrument(skip_all)]
    pub fn finalize_non_quadratic(
        &mut self,
        u: &Element<F, CF, FP>,
        candidate: Candidate<Element<F, CF, FP>>,
    ) -> Result<AffinePoint<Element<F, CF, FP>>, MapToCurveError> {
        let c = self.constants()?.clone();
        let circuit = &mut self.circuit;

        let z_g1x = circuit.mul(&c.z, &candidate.g1x);
        let y1 = circuit.sqrt(&z_g1x)?;
        let zeta_u3 = circuit.mul(&candidate.zeta_u2, u);
        let y = circuit.mul(&zeta_u3, &y1);

        let num_x2 = circuit.mul(&candidate.zeta_u2, &candidate.num_x1);
        let x = circuit.div(&num_x2, &candidate.div)?;
        let y = self.canonical_sign(u, &y)?;

        tracing::info!(num_constraints = self.circuit.num_constraints());

        Ok(AffinePoint { x, y })
    }

    /// Both phases, dispatching on the caller's decision about `g1x`.
    pub fn map_to_curve(
        &mut self,
        u: &Element<F, CF, FP>,
        residuosity: Residuosity,
    ) -> Result<AffinePoint<Element<F, CF, FP>>, MapToCurveError> {
        let candidate = self.candidate(u)?;
        match residuosity {
            Residuosity::Residue => self.finalize_quadratic(u, candidate),
            Residuosity::NonResidue => self.finalize_non_quadratic(u, candidate),
        }
    }

    /// `y` or `-y`, whichever has the parity of `u`.
    fn canonical_sign(
        &mut self,
        u: &Element<F, CF, FP>,
        y: &Element<F, CF, FP>,
    ) -> Result<Element<F, CF, FP>, MapToCurveError> {
        let circuit = &mut self.circuit;
        let y_parity = circuit.parity(y)?;
        let u_parity = circuit.parity(u)?;
        let same = circuit.same_parity(&y_parity, &u_parity);
        let neg_y = circuit.neg(y)?;
        Ok(circuit.select(&same, y, &neg_y))
    }
}
