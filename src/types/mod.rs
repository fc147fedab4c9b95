// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod enums;
pub mod verification;

pub use enums::ProvingSystem;
pub use verification::{NoncedVerificationData, SignatureParts, SubmitProofMessage, VerificationData};
