use ark_ff::PrimeField;
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::ConstraintSystemRef;

use super::{AffinePoint, Candidate, Residuosity, SwuConstants};
use crate::{
    circuit::{CompilationMode, ModuloCircuit},
    curves::{get_fp2_swu_params, CurveId, SwuParams},
    error::MapToCurveError,
    fields::Fp2Element,
};

type Element<F, CF, FP> = Fp2Element<F, CF, FP>;

/// SWU map over `Fp2 = F[i] / (i^2 + 1)`.
///
/// Parity and sign follow the real part, so `y` with a zero real part is
/// never negated.
pub struct MapToCurveG2<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> {
    circuit: ModuloCircuit<F, CF, FP>,
    params: SwuParams<[F; 2]>,
    consts: Option<SwuConstants<Element<F, CF, FP>>>,
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> MapToCurveG2<F, CF, FP> {
    pub fn new(
        name: &str,
        curve_id: CurveId,
        compilation_mode: CompilationMode,
    ) -> Result<Self, MapToCurveError> {
        let params = get_fp2_swu_params(curve_id)?;
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
        let params = get_fp2_swu_params(curve_id)?;
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

    pub fn params(&self) -> &SwuParams<[F; 2]> {
        &self.params
    }

    pub fn consts(&self) -> Option<&SwuConstants<Element<F, CF, FP>>> {
        self.consts.as_ref()
    }

    pub fn set_consts(&mut self) {
        let SwuParams { a, b, z } = self.params;
        let consts = SwuConstants {
            a: self.circuit.fp2_constant(a),
            b: self.circuit.fp2_constant(b),
            z: self.circuit.fp2_constant(z),
            one: self.circuit.fp2_constant([F::one(), F::zero()]),
            zero: self.circuit.fp2_constant([F::zero(), F::zero()]),
        };
        tracing::debug!(
            circuit = self.circuit.name(),
            curve_id = ?self.circuit.curve_id(),
            modulus_class = ?self.circuit.modulus_class(),
            "swu constants set"
        );
        self.consts = Some(consts);
    }

    pub fn write_elements(&mut self, u: [F; 2]) -> Result<Element<F, CF, FP>, MapToCurveError> {
        Ok(self.circuit.write_elements(u)?)
    }

    fn constants(&self) -> Result<&SwuConstants<Element<F, CF, FP>>, MapToCurveError> {
        self.consts.as_ref().ok_or(MapToCurveError::ConstantsNotSet)
    }

    #[tracing::instrument(skip_all)]
    pub fn candidate(
        &mut self,
        u: &Element<F, CF, FP>,
    ) -> Result<Candidate<Element<F, CF, FP>>, MapToCurveError> {
        let c = self.constants()?.clone();
        let circuit = &mut self.circuit;

        let u2 = circuit.fp2_square(u)?;
        let zeta_u2 = circuit.fp2_mul(&c.z, &u2);
        let zeta_u2_sq = circuit.fp2_square(&zeta_u2)?;
        let t = circuit.fp2_add(&zeta_u2_sq, &zeta_u2);

        let neg_t = circuit.fp2_neg(&t)?;
        let t_non_zero = circuit.fp2_is_non_zero(&neg_t)?;
        let neg_t_or_z = circuit.fp2_select(&t_non_zero, &neg_t, &c.z);

        let t_plus_one = circuit.fp2_add(&t, &c.one);
        let num_x1 = circuit.fp2_mul(&c.b, &t_plus_one);
        let div = circuit.fp2_mul(&c.a, &neg_t_or_z);

        let num_x1_sq = circuit.fp2_square(&num_x1)?;
        let div_sq = circuit.fp2_square(&div)?;
        let div_cu = circuit.fp2_mul(&div_sq, &div);
        let a_div_sq = circuit.fp2_mul(&c.a, &div_sq);
        let sum = circuit.fp2_add(&num_x1_sq, &a_div_sq);
        let num_gx1_head = circuit.fp2_mul(&sum, &num_x1);
        let b_div_cu = circuit.fp2_mul(&c.b, &div_cu);
        let num_gx1 = circuit.fp2_add(&num_gx1_head, &b_div_cu);
        let g1x = circuit.fp2_div(&num_gx1, &div_cu)?;

        tracing::info!(num_constraints = circuit.num_constraints());

        Ok(Candidate {
            g1x,
            div,
            num_x1,
            zeta_u2,
        })
    }

    #[tracing::instrument(skip_all)]
    pub fn finalize_quadratic(
        &mut self,
        u: &Element<F, CF, FP>,
        candidate: Candidate<Element<F, CF, FP>>,
    ) -> Result<AffinePoint<Element<F, CF, FP>>, MapToCurveError> {
        self.constants()?;
        let circuit = &mut self.circuit;

        let y = circuit.fp2_sqrt(&candidate.g1x)?;
        let x = circuit.fp2_div(&candidate.num_x1, &candidate.div)?;
        let y = self.canonical_sign(u, &y)?;

        tracing::info!(num_constraints = self.circuit.num_constraints());

        Ok(AffinePoint { x, y })
    }

    #[tracing::instrument(skip_all)]
    pub fn finalize_non_quadratic(
        &mut self,
        u: &Element<F, CF, FP>,
        candidate: Candidate<Element<F, CF, FP>>,
    ) -> Result<AffinePoint<Element<F, CF, FP>>, MapToCurveError> {
        let c = self.constants()?.clone();
        let circuit = &mut self.circuit;

        let z_g1x = circuit.fp2_mul(&c.z, &candidate.g1x);
        let y1 = circuit.fp2_sqrt(&z_g1x)?;
        let zeta_u3 = circuit.fp2_mul(&candidate.zeta_u2, u);
        let y = circuit.fp2_mul(&zeta_u3, &y1);

        let num_x2 = circuit.fp2_mul(&candidate.zeta_u2, &candidate.num_x1);
        let x = circuit.fp2_div(&num_x2, &candidate.div)?;
        let y = self.canonical_sign(u, &y)?;

        tracing::info!(num_constraints = self.circuit.num_constraints());

        Ok(AffinePoint { x, y })
    }

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

    fn canonical_sign(
        &mut self,
        u: &Element<F, CF, FP>,
        y: &Element<F, CF, FP>,
    ) -> Result<Element<F, CF, FP>, MapToCurveError> {
        let circuit = &mut self.circuit;
        let y_parity = circuit.fp2_parity(y)?;
        let u_parity = circuit.fp2_parity(u)?;
        let same = circuit.same_parity(&y_parity, &u_parity);
        let neg_y = circuit.fp2_neg(y)?;
        Ok(circuit.fp2_select(&same, y, &neg_y))
    }
}
