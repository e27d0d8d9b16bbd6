use ark_bls12_381::Fq;
use ark_ec::hashing::curve_maps::wb::WBConfig;
use ark_r1cs_std::fields::{emulated_fp::EmulatedFpVar, fp::FpVar};

use crate::map_to_curve::{MapToCurveG1, MapToCurveG2};

// 11-isogenous E'1 and 3-isogenous E'2, the curves the SWU maps land on
pub type G1IsoConfig = <ark_bls12_381::g1::Config as WBConfig>::IsogenousCurve;
pub type G2IsoConfig = <ark_bls12_381::g2::Config as WBConfig>::IsogenousCurve;

// constraints over Fq itself
pub type NativeMapToCurveG1 = MapToCurveG1<Fq, Fq, FpVar<Fq>>;
pub type NativeMapToCurveG2 = MapToCurveG2<Fq, Fq, FpVar<Fq>>;

// constraints over some other field `CF`, e.g. the scalar field of the SNARK curve
pub type EmulatedMapToCurveG1<CF> = MapToCurveG1<Fq, CF, EmulatedFpVar<Fq, CF>>;
pub type EmulatedMapToCurveG2<CF> = MapToCurveG2<Fq, CF, EmulatedFpVar<Fq, CF>>;
