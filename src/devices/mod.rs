pub mod patterns;
pub mod siren;
