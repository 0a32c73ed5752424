pub mod derivation;
pub mod validation;
