//! Arithmetic over `Fp2 = Fp[i] / (i^2 + 1)` built from base field circuit
//! operations.
//!
//! An element is a pair `(c0, c1)` standing for `c0 + c1 * i`. Everything here
//! is expressed through [`ModuloCircuit`] primitives, so the recorded
//! [`crate::circuit::OpCounts`] reflect the base field cost of each operation.

use ark_ff::{PrimeField, QuadExtConfig, QuadExtField};
use ark_r1cs_std::fields::FieldVar;
use ark_relations::r1cs::SynthesisError;

use crate::circuit::{FieldElement, ModuloCircuit};

/// Handle to an `Fp2` value, real part first.
#[derive(Clone, Debug)]
pub struct Fp2Element<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> {
    pub c0: FieldElement<F, CF, FP>,
    pub c1: FieldElement<F, CF, FP>,
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> Fp2Element<F, CF, FP> {
    pub fn new(c0: FieldElement<F, CF, FP>, c1: FieldElement<F, CF, FP>) -> Self {
        Self { c0, c1 }
    }

    pub fn is_constant(&self) -> bool {
        self.c0.is_constant() && self.c1.is_constant()
    }

    pub fn value(&self) -> Result<[F; 2], SynthesisError> {
        Ok([self.c0.value()?, self.c1.value()?])
    }

    /// Assigned value as an arkworks quadratic extension element.
    pub fn value_as<Q: QuadExtConfig<BaseField = F>>(
        &self,
    ) -> Result<QuadExtField<Q>, SynthesisError> {
        let [c0, c1] = self.value()?;
        Ok(QuadExtField::new(c0, c1))
    }
}

fn fp2_square_value<F: PrimeField>([c0, c1]: [F; 2]) -> [F; 2] {
    [c0.square() - c1.square(), (c0 * c1).double()]
}

/// Whether `c0 + c1 * i` is a square in `Fp2`, decided by the Legendre
/// symbol of its norm `c0^2 + c1^2`. Zero counts as a square.
pub fn fp2_is_square<F: PrimeField>([c0, c1]: [F; 2]) -> bool {
    !(c0.square() + c1.square()).legendre().is_qnr()
}

/// A square root of `c0 + c1 * i`, or `None` if it is not a square.
///
/// Requires `p = 3 mod 4`, so that `-1` is not a square in `Fp`.
pub fn fp2_sqrt_value<F: PrimeField>([c0, c1]: [F; 2]) -> Option<[F; 2]> {
    if c1.is_zero() {
        // either c0 or -c0 is a square in Fp
        return match c0.sqrt() {
            Some(root) => Some([root, F::zero()]),
            None => (-c0).sqrt().map(|root| [F::zero(), root]),
        };
    }

    let norm_root = (c0.square() + c1.square()).sqrt()?;
    let two_inv = F::from(2u64).inverse()?;
    [norm_root, -norm_root].into_iter().find_map(|n| {
        let x0 = ((c0 + n) * two_inv).sqrt()?;
        let x1 = c1 * x0.double().inverse()?;
        Some([x0, x1])
    })
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> ModuloCircuit<F, CF, FP> {
    /// Interned constant `c0 + c1 * i`.
    pub fn fp2_constant(&mut self, [c0, c1]: [F; 2]) -> Fp2Element<F, CF, FP> {
        Fp2Element::new(self.set_or_get_constant(c0), self.set_or_get_constant(c1))
    }

    /// Register `c0 + c1 * i` as a public input.
    pub fn write_elements(
        &mut self,
        [c0, c1]: [F; 2],
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        Ok(Fp2Element::new(
            self.write_element(c0)?,
            self.write_element(c1)?,
        ))
    }

    pub fn fp2_add(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
        b: &Fp2Element<F, CF, FP>,
    ) -> Fp2Element<F, CF, FP> {
        Fp2Element::new(self.add(&a.c0, &b.c0), self.add(&a.c1, &b.c1))
    }

    pub fn fp2_sub(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
        b: &Fp2Element<F, CF, FP>,
    ) -> Fp2Element<F, CF, FP> {
        Fp2Element::new(self.sub(&a.c0, &b.c0), self.sub(&a.c1, &b.c1))
    }

    pub fn fp2_neg(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        Ok(Fp2Element::new(self.neg(&a.c0)?, self.neg(&a.c1)?))
    }

    /// Karatsuba product, three base field multiplications.
    pub fn fp2_mul(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
        b: &Fp2Element<F, CF, FP>,
    ) -> Fp2Element<F, CF, FP> {
        let t0 = self.mul(&a.c0, &b.c0);
        let t1 = self.mul(&a.c1, &b.c1);
        let a_sum = self.add(&a.c0, &a.c1);
        let b_sum = self.add(&b.c0, &b.c1);
        let t2 = self.mul(&a_sum, &b_sum);

        let c0 = self.sub(&t0, &t1);
        let cross = self.sub(&t2, &t0);
        let c1 = self.sub(&cross, &t1);
        Fp2Element::new(c0, c1)
    }

    /// Same shape as [`Self::fp2_mul`] with squarings in place of products.
    pub fn fp2_square(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        let t0 = self.square(&a.c0)?;
        let t1 = self.square(&a.c1)?;
        let sum = self.add(&a.c0, &a.c1);
        let t2 = self.square(&sum)?;

        let c0 = self.sub(&t0, &t1);
        let cross = self.sub(&t2, &t0);
        let c1 = self.sub(&cross, &t1);
        Ok(Fp2Element::new(c0, c1))
    }

    /// `(c0 - c1 * i) / (c0^2 + c1^2)`.
    pub fn fp2_inv(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        let c0_sq = self.square(&a.c0)?;
        let c1_sq = self.square(&a.c1)?;
        let norm = self.add(&c0_sq, &c1_sq);
        let norm_inv = self.inv(&norm)?;

        let neg_c1 = self.neg(&a.c1)?;
        let c0 = self.mul(&a.c0, &norm_inv);
        let c1 = self.mul(&neg_c1, &norm_inv);
        Ok(Fp2Element::new(c0, c1))
    }

    pub fn fp2_div(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
        b: &Fp2Element<F, CF, FP>,
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        let b_inv = self.fp2_inv(b)?;
        Ok(self.fp2_mul(a, &b_inv))
    }

    /// 1 if either part is non-zero, computed as the OR `p + q - pq`.
    pub fn fp2_is_non_zero(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        let p = self.is_non_zero(&a.c0)?;
        let q = self.is_non_zero(&a.c1)?;
        let sum = self.add(&p, &q);
        let pq = self.mul(&p, &q);
        Ok(self.sub(&sum, &pq))
    }

    /// Parity of the real part.
    pub fn fp2_parity(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.parity(&a.c0)
    }

    pub fn fp2_select(
        &mut self,
        flag: &FieldElement<F, CF, FP>,
        a: &Fp2Element<F, CF, FP>,
        b: &Fp2Element<F, CF, FP>,
    ) -> Fp2Element<F, CF, FP> {
        Fp2Element::new(
            self.select(flag, &a.c0, &b.c0),
            self.select(flag, &a.c1, &b.c1),
        )
    }

    /// Square root of `a` as a verified witness pair.
    pub fn fp2_sqrt(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        let target = a.clone();
        self.fp2_sqrt_with_hint(a, move || {
            fp2_sqrt_value(target.value()?).ok_or(SynthesisError::Unsatisfiable)
        })
    }

    /// Allocate the root supplied by `root` and enforce `root^2 == a` on both
    /// parts. As with [`Self::sqrt_with_hint`], residuosity is not checked.
    pub fn fp2_sqrt_with_hint(
        &mut self,
        a: &Fp2Element<F, CF, FP>,
        root: impl FnOnce() -> Result<[F; 2], SynthesisError>,
    ) -> Result<Fp2Element<F, CF, FP>, SynthesisError> {
        if a.is_constant() {
            let root = root()?;
            if fp2_square_value(root) != a.value()? {
                return Err(SynthesisError::Unsatisfiable);
            }
            return Ok(self.fp2_constant(root));
        }

        let root = if self.is_in_setup_mode() {
            None
        } else {
            Some(root()?)
        };
        let c0 = self.alloc_witness(|| {
            root.map(|[c0, _]| c0)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let c1 = self.alloc_witness(|| {
            root.map(|[_, c1]| c1)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let root = Fp2Element::new(c0, c1);

        let squared = self.fp2_square(&root)?;
        self.enforce_equal(&squared.c0, &a.c0)?;
        self.enforce_equal(&squared.c1, &a.c1)?;
        Ok(root)
    }
}

#[cfg(test)]
mod test {
    use ark_bls12_381::{Fq, Fq2};
    use ark_ff::{Field, PrimeField, UniformRand};
    use ark_r1cs_std::fields::{emulated_fp::EmulatedFpVar, fp::FpVar, FieldVar};
    use ark_relations::r1cs::SynthesisError;
    use ark_std::{One, Zero};
    use rand::thread_rng;

    use super::{fp2_is_square, fp2_sqrt_value, Fp2Element};
    use crate::{
        circuit::{CompilationMode, ModuloCircuit, Provenance},
        curves::CurveId,
    };

    type NativeCircuit = ModuloCircuit<Fq, Fq, FpVar<Fq>>;

    fn native() -> NativeCircuit {
        ModuloCircuit::new("fp2", CurveId::Bls12_381, CompilationMode::Prove)
    }

    fn parts(x: Fq2) -> [Fq; 2] {
        [x.c0, x.c1]
    }

    fn fq2<CF: PrimeField, FP: FieldVar<Fq, CF>>(a: &Fp2Element<Fq, CF, FP>) -> Fq2 {
        let [c0, c1] = a.value().unwrap();
        Fq2::new(c0, c1)
    }

    #[test]
    fn arithmetic_matches_fq2() {
        let mut rng = thread_rng();
        let mut circuit = native();
        let (x, y) = (Fq2::rand(&mut rng), Fq2::rand(&mut rng));
        let a = circuit.write_elements(parts(x)).unwrap();
        let b = circuit.write_elements(parts(y)).unwrap();

        let sum = circuit.fp2_add(&a, &b);
        let diff = circuit.fp2_sub(&a, &b);
        let neg = circuit.fp2_neg(&a).unwrap();
        let prod = circuit.fp2_mul(&a, &b);
        let sq = circuit.fp2_square(&a).unwrap();
        let inv = circuit.fp2_inv(&a).unwrap();
        let quot = circuit.fp2_div(&a, &b).unwrap();

        assert_eq!(fq2(&sum), x + y);
        assert_eq!(fq2(&diff), x - y);
        assert_eq!(fq2(&neg), -x);
        assert_eq!(fq2(&prod), x * y);
        assert_eq!(fq2(&sq), x.square());
        assert_eq!(fq2(&inv), x.inverse().unwrap());
        assert_eq!(fq2(&quot), x / y);
        assert!(circuit.cs().is_satisfied().unwrap());
    }

    #[test]
    fn mul_uses_three_base_products() {
        let mut rng = thread_rng();
        let mut circuit = native();
        let a = circuit.write_elements(parts(Fq2::rand(&mut rng))).unwrap();
        let b = circuit.write_elements(parts(Fq2::rand(&mut rng))).unwrap();

        let before = circuit.op_counts();
        let _ = circuit.fp2_mul(&a, &b);
        let after = circuit.op_counts();
        assert_eq!(after.mul - before.mul, 3);

        let _ = circuit.fp2_square(&a).unwrap();
        let squared = circuit.op_counts();
        assert_eq!(squared.mul, after.mul);
        assert_eq!(squared.square - after.square, 3);
    }

    #[test]
    fn select_blends_by_flag() {
        let mut rng = thread_rng();
        let mut circuit = native();
        let (x, y) = (Fq2::rand(&mut rng), Fq2::rand(&mut rng));
        let a = circuit.write_elements(parts(x)).unwrap();
        let b = circuit.write_elements(parts(y)).unwrap();

        let one = circuit.set_or_get_constant(Fq::one());
        let zero = circuit.set_or_get_constant(Fq::zero());
        let picked = circuit.fp2_select(&one, &a, &b);
        assert_eq!(fq2(&picked), x);
        let picked = circuit.fp2_select(&zero, &a, &b);
        assert_eq!(fq2(&picked), y);
        assert!(circuit.cs().is_satisfied().unwrap());
    }

    #[test]
    fn is_non_zero_and_parity() {
        let mut circuit = native();
        let cases = [
            ([Fq::zero(), Fq::zero()], false),
            ([Fq::from(5u64), Fq::zero()], true),
            ([Fq::zero(), Fq::from(5u64)], true),
            ([Fq::from(2u64), Fq::from(7u64)], true),
        ];
        for (value, non_zero) in cases {
            let a = circuit.write_elements(value).unwrap();
            let flag = circuit.fp2_is_non_zero(&a).unwrap();
            assert_eq!(flag.value().unwrap().is_one(), non_zero);
        }

        // parity follows the real part only
        let a = circuit
            .write_elements([Fq::from(3u64), Fq::from(8u64)])
            .unwrap();
        assert!(circuit.fp2_parity(&a).unwrap().value().unwrap().is_one());
        assert!(circuit.cs().is_satisfied().unwrap());
    }

    #[test]
    fn sqrt_value_matches_fq2() {
        let mut rng = thread_rng();
        for _ in 0..16 {
            let x = Fq2::rand(&mut rng);
            let square = x.square();
            let root = fp2_sqrt_value(parts(square)).unwrap();
            assert_eq!(Fq2::new(root[0], root[1]).square(), square);
            assert!(fp2_is_square(parts(square)));
            assert_eq!(fp2_is_square(parts(x)), x.legendre().is_qr() || x.is_zero());
        }

        // purely real values whose Fp root does not exist have an imaginary root
        let minus_four = Fq2::new(-Fq::from(4u64), Fq::zero());
        let root = fp2_sqrt_value(parts(minus_four)).unwrap();
        assert!(root[0].is_zero());
        assert_eq!(Fq2::new(root[0], root[1]).square(), minus_four);
    }

    #[test]
    fn sqrt_is_verified_witness_pair() {
        let mut rng = thread_rng();
        let mut circuit = native();
        let x = Fq2::rand(&mut rng);
        let a = circuit.write_elements(parts(x.square())).unwrap();

        let root = circuit.fp2_sqrt(&a).unwrap();
        assert_eq!(fq2(&root).square(), x.square());
        assert_eq!(root.c0.provenance(), Provenance::Witness);
        assert!(circuit.cs().is_satisfied().unwrap());

        let _ = circuit
            .fp2_sqrt_with_hint(&a, || Ok(parts(x + Fq2::one())))
            .unwrap();
        assert!(!circuit.cs().is_satisfied().unwrap());
    }

    #[test]
    fn sqrt_of_non_square_fails_in_prove_mode() {
        let mut rng = thread_rng();
        let mut circuit = native();
        let non_square = loop {
            let x = Fq2::rand(&mut rng);
            if x.legendre().is_qnr() {
                break x;
            }
        };
        let a = circuit.write_elements(parts(non_square)).unwrap();
        assert!(matches!(
            circuit.fp2_sqrt(&a),
            Err(SynthesisError::Unsatisfiable)
        ));
    }

    #[test]
    fn inverse_of_zero_fails() {
        let mut circuit = native();
        let zero = circuit.write_elements([Fq::zero(), Fq::zero()]).unwrap();
        assert!(matches!(
            circuit.fp2_inv(&zero),
            Err(SynthesisError::DivisionByZero)
        ));
    }

    #[test]
    fn emulated_mul_matches_fq2() {
        type EmulationField = ark_bls12_377::Fr;

        let mut rng = thread_rng();
        let mut circuit: ModuloCircuit<Fq, EmulationField, EmulatedFpVar<Fq, EmulationField>> =
            ModuloCircuit::new("fp2", CurveId::Bls12_381, CompilationMode::Prove);
        let (x, y) = (Fq2::rand(&mut rng), Fq2::rand(&mut rng));
        let a = circuit.write_elements(parts(x)).unwrap();
        let b = circuit.write_elements(parts(y)).unwrap();

        assert_eq!(fq2(&circuit.fp2_mul(&a, &b)), x * y);
        assert_eq!(fq2(&circuit.fp2_div(&a, &b).unwrap()), x / y);
    }
}
