// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proving system identifiers.

use crate::error::KernelError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Proof scheme a submission was produced with.
///
/// The discriminant is the tag byte mixed into the auxiliary data commitment,
/// so it must never be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProvingSystem {
    #[serde(rename = "GnarkPlonkBls12_381")]
    GnarkPlonkBls12381 = 0,
    GnarkPlonkBn254 = 1,
    GnarkGroth16Bn254 = 2,
    #[serde(rename = "SP1")]
    Sp1 = 3,
    Risc0 = 4,
    CircomGroth16Bn256 = 5,
}

impl ProvingSystem {
    pub const ALL: [ProvingSystem; 6] = [
        ProvingSystem::GnarkPlonkBls12381,
        ProvingSystem::GnarkPlonkBn254,
        ProvingSystem::GnarkGroth16Bn254,
        ProvingSystem::Sp1,
        ProvingSystem::Risc0,
        ProvingSystem::CircomGroth16Bn256,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ProvingSystem::GnarkPlonkBls12381),
            1 => Some(ProvingSystem::GnarkPlonkBn254),
            2 => Some(ProvingSystem::GnarkGroth16Bn254),
            3 => Some(ProvingSystem::Sp1),
            4 => Some(ProvingSystem::Risc0),
            5 => Some(ProvingSystem::CircomGroth16Bn256),
            _ => None,
        }
    }

    /// Name used in the submission payload.
    pub fn as_str(self) -> &'static str {
        match self {
            ProvingSystem::GnarkPlonkBls12381 => "GnarkPlonkBls12_381",
            ProvingSystem::GnarkPlonkBn254 => "GnarkPlonkBn254",
            ProvingSystem::GnarkGroth16Bn254 => "GnarkGroth16Bn254",
            ProvingSystem::Sp1 => "SP1",
            ProvingSystem::Risc0 => "Risc0",
            ProvingSystem::CircomGroth16Bn256 => "CircomGroth16Bn256",
        }
    }
}

impl fmt::Display for ProvingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProvingSystem {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProvingSystem::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| KernelError::UnknownProvingSystem(s.to_string()))
    }
}
