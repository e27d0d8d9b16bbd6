use std::marker::PhantomData;

use ark_ff::PrimeField;
use ark_r1cs_std::{fields::FieldVar, R1CSVar};
use ark_relations::r1cs::SynthesisError;

/// How a value is represented in the constraint field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModulusClass {
    /// The curve base field is the constraint field.
    Native,
    /// The curve base field is emulated with limbs over a different constraint field.
    Emulated,
}

impl ModulusClass {
    pub fn of<F: PrimeField, CF: PrimeField>() -> Self {
        if F::characteristic() == CF::characteristic() {
            Self::Native
        } else {
            Self::Emulated
        }
    }
}

/// Where an element came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provenance {
    Constant,
    Input,
    Witness,
    Derived,
}

/// Identity of an element inside a single circuit build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// Handle to a base field value tracked by a [`super::ModuloCircuit`].
///
/// Handles are immutable. Every arithmetic operation returns a new handle.
#[derive(Clone, Debug)]
pub struct FieldElement<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> {
    var: FP,
    id: ElementId,
    provenance: Provenance,
    _field: PhantomData<(F, CF)>,
}

impl<F: PrimeField, CF: PrimeField, FP: FieldVar<F, CF>> FieldElement<F, CF, FP> {
    pub(crate) fn new(var: FP, id: ElementId, provenance: Provenance) -> Self {
        Self {
            var,
            id,
            provenance,
            _field: PhantomData,
        }
    }

    pub fn var(&self) -> &FP {
        &self.var
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn modulus_class(&self) -> ModulusClass {
        ModulusClass::of::<F, CF>()
    }

    pub fn is_constant(&self) -> bool {
        self.var.is_constant()
    }

    /// Assigned value, unavailable in setup mode.
    pub fn value(&self) -> Result<F, SynthesisError> {
        self.var.value()
    }
}

#[cfg(test)]
mod test {
    use ark_bls12_381::Fq;
    use ark_ff::PrimeField;

    use super::ModulusClass;

    #[test]
    fn modulus_class() {
        type EmulationField = ark_bls12_377::Fr;

        assert_eq!(ModulusClass::of::<Fq, Fq>(), ModulusClass::Native);
        assert_eq!(
            ModulusClass::of::<Fq, EmulationField>(),
            ModulusClass::Emulated
        );
        assert_ne!(Fq::MODULUS_BIT_SIZE, EmulationField::MODULUS_BIT_SIZE);
    }
}
