pub mod fp2;

pub use fp2::{fp2_is_square, fp2_sqrt_value, Fp2Element};
