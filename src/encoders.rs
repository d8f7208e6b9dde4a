pub mod bool_diff;
pub mod fault_enc;
pub mod ffr_enc;
pub mod mffc_enc;

pub use bool_diff::BoolDiffEnc;
pub use fault_enc::FaultEnc;
pub use ffr_enc::FfrEnc;
pub use mffc_enc::MffcEnc;
