use std::str::FromStr;

use ark_ff::PrimeField;

use crate::error::MapToCurveError;

/// Curve identifiers shared with the rest of the circuit tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveId {
    Bn254 = 0,
    Bls12_381 = 1,
    Secp256k1 = 2,
    Secp256r1 = 3,
    Ed25519 = 4,
    Grumpkin = 5,
}

impl CurveId {
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for CurveId {
    type Error = MapToCurveError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bn254),
            1 => Ok(Self::Bls12_381),
            2 => Ok(Self::Secp256k1),
            3 => Ok(Self::Secp256r1),
            4 => Ok(Self::Ed25519),
            5 => Ok(Self::Grumpkin),
            _ => Err(MapToCurveError::UnknownCurve(value)),
        }
    }
}

/// Coefficients of the SWU curve `E': y^2 = x^3 + A * x + B` and the
/// non-residue `Z` used by the map.
///
/// `T` is `F` for maps over the base field and `[F; 2]` (real, imaginary) for
/// maps over the quadratic extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwuParams<T> {
    pub a: T,
    pub b: T,
    pub z: T,
}

struct SwuCurveEntry {
    id: CurveId,
    modulus: &'static str,
    g1: SwuParams<&'static str>,
    g2: SwuParams<[&'static str; 2]>,
}

// Decimal literals, a leading '-' negates.
// The quadratic extension of every registered curve is Fp[i] / (i^2 + 1).
const SWU_CURVES: &[SwuCurveEntry] = &[SwuCurveEntry {
    id: CurveId::Bls12_381,
    modulus: "4002409555221667393417789825735904156556882819939007885332058136124031650490837864442687629129015664037894272559787",
    // 11-isogenous curve E'1
    g1: SwuParams {
        a: "12190336318893619529228877361869031420615612348429846051986726275283378313155663745811710833465465981901188123677",
        b: "2906670324641927570491258158026293881577086121416628140204402091718288198173574630967936031029026176254968826637280",
        z: "11",
    },
    // 3-isogenous curve E'2
    g2: SwuParams {
        a: ["0", "240"],
        b: ["1012", "1012"],
        z: ["-2", "-1"],
    },
}];

fn lookup<F: PrimeField>(curve_id: CurveId) -> Result<&'static SwuCurveEntry, MapToCurveError> {
    let entry = SWU_CURVES
        .iter()
        .find(|entry| entry.id == curve_id)
        .ok_or(MapToCurveError::UnknownCurve(curve_id.index()))?;

    if F::MODULUS.to_string() != entry.modulus {
        return Err(MapToCurveError::ModulusMismatch { curve: curve_id });
    }

    Ok(entry)
}

fn parse_constant<F: PrimeField>(literal: &'static str) -> Result<F, MapToCurveError> {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, literal),
    };
    let value = F::from_str(digits).map_err(|_| MapToCurveError::InvalidConstant(literal))?;
    Ok(if negative { -value } else { value })
}

/// SWU parameters of the base field map for `curve_id`.
pub fn get_swu_params<F: PrimeField>(curve_id: CurveId) -> Result<SwuParams<F>, MapToCurveError> {
    let g1 = &lookup::<F>(curve_id)?.g1;
    Ok(SwuParams {
        a: parse_constant(g1.a)?,
        b: parse_constant(g1.b)?,
        z: parse_constant(g1.z)?,
    })
}

/// SWU parameters of the quadratic extension map for `curve_id`.
pub fn get_fp2_swu_params<F: PrimeField>(
    curve_id: CurveId,
) -> Result<SwuParams<[F; 2]>, MapToCurveError> {
    let g2 = &lookup::<F>(curve_id)?.g2;
    let parse_pair = |[c0, c1]: [&'static str; 2]| -> Result<[F; 2], MapToCurveError> {
        Ok([parse_constant(c0)?, parse_constant(c1)?])
    };
    Ok(SwuParams {
        a: parse_pair(g2.a)?,
        b: parse_pair(g2.b)?,
        z: parse_pair(g2.z)?,
    })
}

#[cfg(test)]
mod test {
    use ark_bls12_381::{Fq, Fq2};
    use ark_ec::{hashing::curve_maps::swu::SWUConfig, short_weierstrass::SWCurveConfig};

    use super::{get_fp2_swu_params, get_swu_params, CurveId};
    use crate::{
        bls12_381::{G1IsoConfig, G2IsoConfig},
        error::MapToCurveError,
    };

    #[test]
    fn curve_id_round_trip() {
        for index in 0..6 {
            assert_eq!(CurveId::try_from(index).unwrap().index(), index);
        }
        assert!(matches!(
            CurveId::try_from(42),
            Err(MapToCurveError::UnknownCurve(42))
        ));
    }

    #[test]
    fn bls12_381_g1_params_match_arkworks() {
        let params = get_swu_params::<Fq>(CurveId::Bls12_381).unwrap();
        assert_eq!(params.a, G1IsoConfig::COEFF_A);
        assert_eq!(params.b, G1IsoConfig::COEFF_B);
        assert_eq!(params.z, <G1IsoConfig as SWUConfig>::ZETA);
    }

    #[test]
    fn bls12_381_g2_params_match_arkworks() {
        let params = get_fp2_swu_params::<Fq>(CurveId::Bls12_381).unwrap();
        let to_fq2 = |[c0, c1]: [Fq; 2]| Fq2::new(c0, c1);
        assert_eq!(to_fq2(params.a), G2IsoConfig::COEFF_A);
        assert_eq!(to_fq2(params.b), G2IsoConfig::COEFF_B);
        assert_eq!(to_fq2(params.z), <G2IsoConfig as SWUConfig>::ZETA);
    }

    #[test]
    fn unregistered_curve_is_rejected() {
        assert!(matches!(
            get_swu_params::<Fq>(CurveId::Bn254),
            Err(MapToCurveError::UnknownCurve(0))
        ));
        assert!(matches!(
            get_fp2_swu_params::<Fq>(CurveId::Secp256k1),
            Err(MapToCurveError::UnknownCurve(2))
        ));
    }

    #[test]
    fn wrong_field_is_rejected() {
        assert!(matches!(
            get_swu_params::<ark_bls12_381::Fr>(CurveId::Bls12_381),
            Err(MapToCurveError::ModulusMismatch {
                curve: CurveId::Bls12_381
            })
        ));
    }
}
