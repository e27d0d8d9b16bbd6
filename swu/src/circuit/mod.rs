mod element;

pub use element::{ElementId, FieldElement, ModulusClass, Provenance};

use std::collections::HashMap;

use ark_ff::PrimeField;
use ark_r1cs_std::{
    alloc::AllocVar, convert::ToBitsGadget, eq::EqGadget, fields::FieldVar, prelude::Boolean,
};
use ark_relations::r1cs::{
    ConstraintSystem, ConstraintSystemRef, OptimizationGoal, SynthesisError, SynthesisMode,
};

use crate::curves::CurveId;

/// Whether witness values are assigned while building the circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompilationMode {
    /// Constraints and witness assignment.
    #[default]
    Prove,
    /// Constraints only. Values are unavailable and nothing witness-dependent is checked.
    Setup,
}

impl CompilationMode {
    fn synthesis_mode(self) -> SynthesisMode {
        match self {
            Self::Prove => SynthesisMode::Prove {
                construct_matrices: true,
            },
            Self::Setup => SynthesisMode::Setup,
        }
    }
}

/// Number of primitive operations recorded by a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub add: usize,
    pub sub: usize,
    pub neg: usize,
    pub mul: usize,
    pub square: usize,
    pub inv: usize,
    pub sqrt: usize,
    pub parity: usize,
    pub is_non_zero: usize,
}

/// A circuit build over the base field `F`, with constraints in `CF`.
///
/// `FP` is `FpVar<F>` when `F == CF` and `EmulatedFpVar<F, CF>` otherwise.
/// The build owns its constraint system, the interned constants and the
/// element id counter; nothing is shared between builds.
pub struct ModuloCircuit<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> {
    name: String,
    curve_id: CurveId,
    cs: ConstraintSystemRef<CF>,
    constants: HashMap<F, FieldElement<F, CF, FP>>,
    next_id: usize,
    op_counts: OpCounts,
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> ModuloCircuit<F, CF, FP> {
    pub fn new(name: &str, curve_id: CurveId, compilation_mode: CompilationMode) -> Self {
        let cs = ConstraintSystem::<CF>::new_ref();
        // limb parameters of emulated vars depend on the goal, so set it before allocating
        cs.set_optimization_goal(OptimizationGoal::Constraints);
        cs.set_mode(compilation_mode.synthesis_mode());
        Self::from_cs(name, curve_id, cs)
    }

    /// Build on top of an existing constraint system.
    pub fn from_cs(name: &str, curve_id: CurveId, cs: ConstraintSystemRef<CF>) -> Self {
        tracing::debug!(
            circuit = name,
            ?curve_id,
            modulus_class = ?ModulusClass::of::<F, CF>(),
            setup = cs.is_in_setup_mode(),
            "new circuit build"
        );
        Self {
            name: name.to_owned(),
            curve_id,
            cs,
            constants: HashMap::new(),
            next_id: 0,
            op_counts: OpCounts::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn curve_id(&self) -> CurveId {
        self.curve_id
    }

    pub fn cs(&self) -> ConstraintSystemRef<CF> {
        self.cs.clone()
    }

    pub fn is_in_setup_mode(&self) -> bool {
        self.cs.is_in_setup_mode()
    }

    pub fn num_constraints(&self) -> usize {
        self.cs.num_constraints()
    }

    pub fn op_counts(&self) -> OpCounts {
        self.op_counts
    }

    pub fn modulus_class(&self) -> ModulusClass {
        ModulusClass::of::<F, CF>()
    }

    fn next_element(&mut self, var: FP, provenance: Provenance) -> FieldElement<F, CF, FP> {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        FieldElement::new(var, id, provenance)
    }

    fn derive(&mut self, var: FP) -> FieldElement<F, CF, FP> {
        self.next_element(var, Provenance::Derived)
    }

    /// Interned constant: the same value always yields the same handle.
    pub fn set_or_get_constant(&mut self, value: F) -> FieldElement<F, CF, FP> {
        if let Some(element) = self.constants.get(&value) {
            return element.clone();
        }
        let element = self.next_element(FP::constant(value), Provenance::Constant);
        self.constants.insert(value, element.clone());
        element
    }

    /// Register a public input.
    pub fn write_element(&mut self, value: F) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        let var = FP::new_input(self.cs.clone(), || Ok(value))?;
        Ok(self.next_element(var, Provenance::Input))
    }

    /// Register a private witness.
    pub fn write_witness(&mut self, value: F) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.alloc_witness(|| Ok(value))
    }

    /// Register a private witness whose value is only produced in prove mode.
    pub fn alloc_witness(
        &mut self,
        value: impl FnOnce() -> Result<F, SynthesisError>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        let var = FP::new_witness(self.cs.clone(), value)?;
        Ok(self.next_element(var, Provenance::Witness))
    }

    pub fn enforce_equal(
        &mut self,
        a: &FieldElement<F, CF, FP>,
        b: &FieldElement<F, CF, FP>,
    ) -> Result<(), SynthesisError> {
        a.var().enforce_equal(b.var())
    }

    pub fn add(
        &mut self,
        a: &FieldElement<F, CF, FP>,
        b: &FieldElement<F, CF, FP>,
    ) -> FieldElement<F, CF, FP> {
        self.op_counts.add += 1;
        self.derive(a.var().clone() + b.var())
    }

    pub fn sub(
        &mut self,
        a: &FieldElement<F, CF, FP>,
        b: &FieldElement<F, CF, FP>,
    ) -> FieldElement<F, CF, FP> {
        self.op_counts.sub += 1;
        self.derive(a.var().clone() - b.var())
    }

    pub fn neg(
        &mut self,
        a: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.op_counts.neg += 1;
        let var = a.var().negate()?;
        Ok(self.derive(var))
    }

    pub fn mul(
        &mut self,
        a: &FieldElement<F, CF, FP>,
        b: &FieldElement<F, CF, FP>,
    ) -> FieldElement<F, CF, FP> {
        self.op_counts.mul += 1;
        self.derive(a.var().clone() * b.var())
    }

    pub fn square(
        &mut self,
        a: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.op_counts.square += 1;
        let var = a.var().square()?;
        Ok(self.derive(var))
    }

    /// Inverse of `a`, enforced as `a * a^-1 == 1`.
    ///
    /// Fails eagerly with [`SynthesisError::DivisionByZero`] when the value of
    /// `a` is known to be zero.
    pub fn inv(
        &mut self,
        a: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        if a.value().is_ok_and(|value| value.is_zero()) {
            return Err(SynthesisError::DivisionByZero);
        }
        self.op_counts.inv += 1;
        let var = a.var().inverse()?;
        Ok(self.derive(var))
    }

    pub fn div(
        &mut self,
        a: &FieldElement<F, CF, FP>,
        b: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        let b_inv = self.inv(b)?;
        Ok(self.mul(a, &b_inv))
    }

    /// Square root of `a` as a verified witness. See [`Self::sqrt_with_hint`].
    pub fn sqrt(
        &mut self,
        a: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        let target = a.clone();
        self.sqrt_with_hint(a, move || {
            target.value()?.sqrt().ok_or(SynthesisError::Unsatisfiable)
        })
    }

    /// Allocate the root supplied by `root` and enforce `root^2 == a`.
    ///
    /// Nothing here decides whether `a` is a quadratic residue. If it is not,
    /// the hint cannot produce a root: in prove mode this surfaces as an error
    /// from the hint, in setup mode the circuit is left unsatisfiable.
    pub fn sqrt_with_hint(
        &mut self,
        a: &FieldElement<F, CF, FP>,
        root: impl FnOnce() -> Result<F, SynthesisError>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.op_counts.sqrt += 1;

        if a.is_constant() {
            let root = root()?;
            if root.square() != a.value()? {
                return Err(SynthesisError::Unsatisfiable);
            }
            return Ok(self.derive(FP::constant(root)));
        }

        // evaluated here so that a missing root fails the same way for every `FP`
        let root = if self.cs.is_in_setup_mode() {
            None
        } else {
            Some(root()?)
        };
        let root = self.alloc_witness(|| root.ok_or(SynthesisError::AssignmentMissing))?;
        root.var().square()?.enforce_equal(a.var())?;
        Ok(root)
    }

    /// Least significant bit of the canonical representative of `a`, as 0 or 1.
    pub fn parity(
        &mut self,
        a: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.op_counts.parity += 1;
        let lsb = a
            .var()
            .to_bits_le()?
            .into_iter()
            .next()
            .ok_or(SynthesisError::Unsatisfiable)?;
        Ok(self.derive(FP::from(lsb)))
    }

    /// 1 if `a != 0`, 0 otherwise.
    pub fn is_non_zero(
        &mut self,
        a: &FieldElement<F, CF, FP>,
    ) -> Result<FieldElement<F, CF, FP>, SynthesisError> {
        self.op_counts.is_non_zero += 1;
        let is_zero: Boolean<CF> = a.var().is_zero()?;
        Ok(self.derive(FP::from(!is_zero)))
    }

    /// `flag * a + (1 - flag) * b` for a 0/1 `flag`, computed as `b + flag * (a - b)`.
    pub fn select(
        &mut self,
        flag: &FieldElement<F, CF, FP>,
        a: &FieldElement<F, CF, FP>,
        b: &FieldElement<F, CF, FP>,
    ) -> FieldElement<F, CF, FP> {
        let diff = self.sub(a, b);
        let picked = self.mul(flag, &diff);
        self.add(b, &picked)
    }

    /// XNOR of two 0/1 flags: `1 - (p + q - 2pq)`.
    pub fn same_parity(
        &mut self,
        p: &FieldElement<F, CF, FP>,
        q: &FieldElement<F, CF, FP>,
    ) -> FieldElement<F, CF, FP> {
        let one = self.set_or_get_constant(F::one());
        let two = self.set_or_get_constant(F::from(2u64));
        let sum = self.add(p, q);
        let pq = self.mul(p, q);
        let two_pq = self.mul(&two, &pq);
        let xor = self.sub(&sum, &two_pq);
        self.sub(&one, &xor)
    }
}
