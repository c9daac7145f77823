// crates/bizreg-core/src/core/identifiers.rs
// ============================================================================
// Module: Bizreg Identifiers
// Description: Registry and operation identifiers for the gateway catalog.
// Purpose: Provide closed, exhaustively matchable tags with stable string forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Registries and operations are closed enums. Every (registry, operation) pair
//! is a distinct [`Operation`] variant so request building and validation can
//! dispatch with exhaustive matches instead of string comparisons.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Business registry exposed through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Registry {
    /// CEIDG register of sole proprietors and civil partnerships.
    #[serde(rename = "ceidg")]
    Ceidg,
    /// GUS BIR (REGON) national business register.
    #[serde(rename = "gus")]
    GusBir,
}

impl Registry {
    /// All registries in catalog order.
    pub const ALL: [Self; 2] = [Self::Ceidg, Self::GusBir];

    /// Returns the stable label for the registry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ceidg => "ceidg",
            Self::GusBir => "gus",
        }
    }

    /// Returns the human-facing registry name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ceidg => "CEIDG",
            Self::GusBir => "GUS BIR (REGON)",
        }
    }

    /// Returns the nested result collection key flattened by the interpreter.
    #[must_use]
    pub const fn collection_key(self) -> Option<&'static str> {
        match self {
            Self::Ceidg => Some("firmy"),
            Self::GusBir => None,
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a registry label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown registry: {0}")]
pub struct UnknownRegistryError(pub String);

impl FromStr for Registry {
    type Err = UnknownRegistryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ceidg" => Ok(Self::Ceidg),
            "gus" | "gusbir" | "regon" => Ok(Self::GusBir),
            _ => Err(UnknownRegistryError(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Operation
// ============================================================================

/// Catalog operation, one variant per registry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// CEIDG search by identifier or name with optional filters.
    CeidgSearch,
    /// CEIDG lookup of a single entry by its CEIDG identifier.
    CeidgGetFirma,
    /// CEIDG listing of entries changed since a date.
    CeidgGetChanges,
    /// GUS BIR search by NIP, REGON, or KRS.
    GusSearch,
    /// GUS BIR full report for a REGON number.
    GusReport,
    /// GUS BIR summary report of database changes.
    GusSummary,
}

impl Operation {
    /// All operations in catalog order.
    pub const ALL: [Self; 6] = [
        Self::CeidgSearch,
        Self::CeidgGetFirma,
        Self::CeidgGetChanges,
        Self::GusSearch,
        Self::GusReport,
        Self::GusSummary,
    ];

    /// Returns the registry that owns this operation.
    #[must_use]
    pub const fn registry(self) -> Registry {
        match self {
            Self::CeidgSearch | Self::CeidgGetFirma | Self::CeidgGetChanges => Registry::Ceidg,
            Self::GusSearch | Self::GusReport | Self::GusSummary => Registry::GusBir,
        }
    }

    /// Returns the canonical operation tag within its registry.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::CeidgSearch | Self::GusSearch => "search",
            Self::CeidgGetFirma => "getFirma",
            Self::CeidgGetChanges => "getChanges",
            Self::GusReport => "report",
            Self::GusSummary => "summary",
        }
    }

    /// Returns alternate tags accepted for this operation.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::CeidgGetFirma => &["getById"],
            Self::GusSummary => &["summaryReport"],
            Self::CeidgSearch | Self::CeidgGetChanges | Self::GusSearch | Self::GusReport => &[],
        }
    }

    /// Resolves an operation tag within a registry.
    ///
    /// Tags are matched exactly against the canonical tag and its aliases.
    #[must_use]
    pub fn resolve(registry: Registry, tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operation| {
            operation.registry() == registry
                && (operation.tag() == tag || operation.aliases().contains(&tag))
        })
    }

    /// Returns operations owned by a registry in catalog order.
    pub fn for_registry(registry: Registry) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |operation| operation.registry() == registry)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.registry(), self.tag())
    }
}
