// crates/bizreg-core/src/core/catalog.rs
// ============================================================================
// Module: Bizreg Operation Catalog
// Description: Static parameter schemas and request shapes for every operation.
// Purpose: Serve as the dispatch table for validation and request building.
// Dependencies: serde, crate::core::{identifiers, request}
// ============================================================================

//! ## Overview
//! Each [`Operation`] maps to exactly one static [`OperationSpec`] holding its
//! HTTP method, path template, and ordered parameter definitions. Validation
//! and request building both walk the same definitions, so the wire shape of
//! an operation is declared in one place.
//! Invariants:
//! - Parameter order is the order of emitted query pairs and body fields.
//! - At most one parameter is interpolated into the path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::Operation;
use crate::core::identifiers::Registry;
use crate::core::request::HttpMethod;

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Identifier kinds accepted by CEIDG search.
pub const CEIDG_SEARCH_BY: &[&str] = &["nip", "regon", "nazwa"];

/// CEIDG entry statuses accepted by the search status filter.
pub const CEIDG_STATUSES: &[&str] = &[
    "AKTYWNY",
    "ZAWIESZONY",
    "WYKRESLONY",
    "OCZEKUJE_NA_ROZPOCZECIE_DZIALANOSCI",
    "WYLACZNIE_W_FORMIE_SPOLKI",
];

/// Identifier kinds accepted by GUS BIR search.
pub const GUS_SEARCH_BY: &[&str] = &["nip", "regon", "krs"];

/// GUS BIR full report subtypes (natural person and legal entity variants).
pub const GUS_REPORT_TYPES: &[&str] = &[
    "BIR11OsFizycznaDaneOgolne",
    "BIR11OsFizycznaDzialalnoscCeidg",
    "BIR11OsFizycznaDzialalnoscRolnicza",
    "BIR11OsFizycznaDzialalnoscPozostala",
    "BIR11OsFizycznaPkd",
    "BIR11OsFizycznaListaJednLokalnych",
    "BIR11JednLokalnaOsFizycznej",
    "BIR11JednLokalnaOsFizycznejPkd",
    "BIR11OsPrawna",
    "BIR11OsPrawnaPkd",
    "BIR11OsPrawnaListaJednLokalnych",
    "BIR11JednLokalnaOsPrawnej",
    "BIR11JednLokalnaOsPrawnejPkd",
    "BIR11OsPrawnaSpCywilnaWspolnicy",
    "BIR11TypPodmiotu",
    "PublDaneRaportFizycznaOsoba",
    "PublDaneRaportPrawna",
    "PublDaneRaportDzialalnoscFizycznejCeidg",
    "PublDaneRaportDzialalnosciPrawnej",
    "PublDaneRaportTypJednostki",
];

/// GUS BIR summary report subtypes (change categories).
pub const GUS_SUMMARY_REPORT_TYPES: &[&str] = &[
    "BIR11NowePodmiotyPrawneOrazDzialalnosciOsFizycznych",
    "BIR11AktualizowanePodmiotyPrawneOrazDzialalnosciOsFizycznych",
    "BIR11SkreslonePodmiotyPrawneOrazDzialalnosciOsFizycznych",
    "BIR11NoweJednostkiLokalne",
    "BIR11AktualizowaneJednostkiLokalne",
    "BIR11SkresloneJednostkiLokalne",
];

/// Maximum page size accepted by list-style operations.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum age of a GUS BIR summary report date, in days.
pub const SUMMARY_MAX_AGE_DAYS: i64 = 7;

// ============================================================================
// SECTION: Schema Types
// ============================================================================

/// Value kind and constraints of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamKind {
    /// Free text, trimmed before use.
    Text,
    /// Integer within an inclusive range.
    Integer {
        /// Inclusive lower bound.
        min: i64,
        /// Optional inclusive upper bound.
        max: Option<i64>,
    },
    /// Boolean flag.
    Boolean,
    /// One value from a closed set.
    Choice {
        /// Allowed values.
        values: &'static [&'static str],
    },
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// Calendar date no older than the given number of days.
    RecentDate {
        /// Maximum age relative to the reference date.
        max_age_days: i64,
    },
    /// Decimal digit string of one of the given lengths.
    Digits {
        /// Accepted lengths.
        lengths: &'static [usize],
    },
}

/// Default value applied when a parameter is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    /// Text default.
    Text(&'static str),
    /// Integer default.
    Integer(i64),
    /// Boolean default.
    Boolean(bool),
}

/// Nested parameter collection a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGroup {
    /// Optional search filters.
    Filters,
    /// Optional request options.
    Options,
}

impl ParamGroup {
    /// Returns the key of the nested collection in a raw parameter bag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filters => "filters",
            Self::Options => "options",
        }
    }
}

/// Definition of a single operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamDef {
    /// Parameter name in the raw parameter bag.
    pub name: &'static str,
    /// Key used on the wire (query key or body field).
    pub wire: &'static str,
    /// Value kind and constraints.
    pub kind: ParamKind,
    /// Whether the parameter must be present and non-empty.
    pub required: bool,
    /// Default applied when absent.
    pub default: Option<ParamDefault>,
    /// Nested collection the parameter lives in, if any.
    pub group: Option<ParamGroup>,
    /// Short human-facing description.
    pub description: &'static str,
}

impl ParamDef {
    /// Creates an optional ungrouped parameter without a default.
    const fn new(name: &'static str, wire: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            wire,
            kind,
            required: false,
            default: None,
            group: None,
            description: "",
        }
    }

    /// Marks the parameter as required.
    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    const fn default_value(mut self, default: ParamDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Places the parameter in a nested collection.
    const fn grouped(mut self, group: ParamGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// Attaches a description.
    const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Static description of an operation's request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationSpec {
    /// Operation described by this spec.
    pub operation: Operation,
    /// HTTP method used for the request.
    pub method: HttpMethod,
    /// Path suffix appended to the gateway URL; may hold one `{name}` placeholder.
    pub path: &'static str,
    /// Parameter interpolated into the path placeholder, if any.
    pub path_param: Option<&'static str>,
    /// Ordered parameter definitions.
    pub params: &'static [ParamDef],
    /// Short human-facing summary.
    pub summary: &'static str,
}

impl OperationSpec {
    /// Returns the registry that owns the operation.
    #[must_use]
    pub const fn registry(&self) -> Registry {
        self.operation.registry()
    }

    /// Returns the definition of a named parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'static ParamDef> {
        self.params.iter().find(|def| def.name == name)
    }
}

// ============================================================================
// SECTION: Shared Parameters
// ============================================================================

/// Integer bound for page sizes.
const PAGE_SIZE: ParamKind = ParamKind::Integer {
    min: 1,
    max: Some(MAX_PAGE_SIZE),
};

/// GUS BIR response normalization flag shared by all GUS operations.
const GUS_NORMALIZE: ParamDef = ParamDef::new("normalize", "normalize", ParamKind::Boolean)
    .default_value(ParamDefault::Boolean(true))
    .grouped(ParamGroup::Options)
    .describe("Normalize response keys (remove prefixes, use camelCase)");

// ============================================================================
// SECTION: CEIDG Operations
// ============================================================================

/// CEIDG search parameters.
const CEIDG_SEARCH_PARAMS: &[ParamDef] = &[
    ParamDef::new("searchBy", "searchBy", ParamKind::Choice {
        values: CEIDG_SEARCH_BY,
    })
    .required()
    .default_value(ParamDefault::Text("nip")),
    ParamDef::new("searchValue", "value", ParamKind::Text)
        .required()
        .describe("The value to search for"),
    ParamDef::new("status", "status", ParamKind::Choice {
        values: CEIDG_STATUSES,
    })
    .grouped(ParamGroup::Filters),
    ParamDef::new("miasto", "miasto", ParamKind::Text)
        .grouped(ParamGroup::Filters)
        .describe("City"),
    ParamDef::new("wojewodztwo", "wojewodztwo", ParamKind::Text)
        .grouped(ParamGroup::Filters)
        .describe("Province"),
    ParamDef::new("pkd", "pkd", ParamKind::Text)
        .grouped(ParamGroup::Filters)
        .describe("Polish Classification of Activities code"),
    ParamDef::new("limit", "limit", PAGE_SIZE)
        .grouped(ParamGroup::Filters)
        .describe("Max number of results to return"),
    ParamDef::new("page", "page", ParamKind::Integer {
        min: 1,
        max: None,
    })
    .grouped(ParamGroup::Filters)
    .describe("Page number for pagination (starting from 1)"),
];

/// CEIDG search operation.
static CEIDG_SEARCH: OperationSpec = OperationSpec {
    operation: Operation::CeidgSearch,
    method: HttpMethod::Get,
    path: "/api/ceidg/search",
    path_param: None,
    params: CEIDG_SEARCH_PARAMS,
    summary: "Search for sole proprietorships by various criteria",
};

/// CEIDG lookup-by-identifier parameters.
const CEIDG_GET_FIRMA_PARAMS: &[ParamDef] = &[ParamDef::new("firmaId", "firmaId", ParamKind::Text)
    .required()
    .describe("CEIDG identifier of the entry (the \"id\" field of search results)")];

/// CEIDG lookup-by-identifier operation.
static CEIDG_GET_FIRMA: OperationSpec = OperationSpec {
    operation: Operation::CeidgGetFirma,
    method: HttpMethod::Get,
    path: "/api/ceidg/firma/{firmaId}",
    path_param: Some("firmaId"),
    params: CEIDG_GET_FIRMA_PARAMS,
    summary: "Fetch full details of a single entry using its CEIDG identifier",
};

/// CEIDG change listing parameters.
const CEIDG_GET_CHANGES_PARAMS: &[ParamDef] = &[
    ParamDef::new("changeDateFrom", "dateFrom", ParamKind::Date)
        .required()
        .describe("Start date for changes (YYYY-MM-DD)"),
    ParamDef::new("changeDateTo", "dateTo", ParamKind::Date)
        .describe("End date for changes (YYYY-MM-DD)"),
    ParamDef::new("changeLimit", "limit", PAGE_SIZE)
        .default_value(ParamDefault::Integer(25))
        .describe("Max number of results"),
];

/// CEIDG change listing operation.
static CEIDG_GET_CHANGES: OperationSpec = OperationSpec {
    operation: Operation::CeidgGetChanges,
    method: HttpMethod::Get,
    path: "/api/ceidg/changes",
    path_param: None,
    params: CEIDG_GET_CHANGES_PARAMS,
    summary: "Get list of company identifiers with recent changes",
};

// ============================================================================
// SECTION: GUS BIR Operations
// ============================================================================

/// GUS BIR search parameters.
const GUS_SEARCH_PARAMS: &[ParamDef] = &[
    ParamDef::new("searchBy", "searchBy", ParamKind::Choice {
        values: GUS_SEARCH_BY,
    })
    .required()
    .default_value(ParamDefault::Text("nip")),
    ParamDef::new("identifier", "identifier", ParamKind::Text)
        .required()
        .describe("NIP, REGON, or KRS number to search for"),
    GUS_NORMALIZE,
];

/// GUS BIR search operation.
static GUS_SEARCH: OperationSpec = OperationSpec {
    operation: Operation::GusSearch,
    method: HttpMethod::Post,
    path: "/api/gus/search",
    path_param: None,
    params: GUS_SEARCH_PARAMS,
    summary: "Find a company in the REGON database",
};

/// GUS BIR full report parameters.
const GUS_REPORT_PARAMS: &[ParamDef] = &[
    ParamDef::new("regon", "regon", ParamKind::Digits {
        lengths: &[9, 14],
    })
    .required()
    .describe("9 or 14-digit REGON number"),
    ParamDef::new("reportType", "reportType", ParamKind::Choice {
        values: GUS_REPORT_TYPES,
    })
    .required()
    .default_value(ParamDefault::Text("BIR11OsFizycznaDaneOgolne")),
    GUS_NORMALIZE,
];

/// GUS BIR full report operation.
static GUS_REPORT: OperationSpec = OperationSpec {
    operation: Operation::GusReport,
    method: HttpMethod::Post,
    path: "/api/gus/report",
    path_param: None,
    params: GUS_REPORT_PARAMS,
    summary: "Get detailed report for a company by REGON",
};

/// GUS BIR summary report parameters.
const GUS_SUMMARY_PARAMS: &[ParamDef] = &[
    ParamDef::new("summaryDate", "date", ParamKind::RecentDate {
        max_age_days: SUMMARY_MAX_AGE_DAYS,
    })
    .required()
    .describe("Date in YYYY-MM-DD format (not earlier than 7 days ago)"),
    ParamDef::new("summaryReportType", "reportType", ParamKind::Choice {
        values: GUS_SUMMARY_REPORT_TYPES,
    })
    .required()
    .default_value(ParamDefault::Text("BIR11NowePodmiotyPrawneOrazDzialalnosciOsFizycznych")),
    GUS_NORMALIZE,
];

/// GUS BIR summary report operation.
static GUS_SUMMARY: OperationSpec = OperationSpec {
    operation: Operation::GusSummary,
    method: HttpMethod::Post,
    path: "/api/gus/summary",
    path_param: None,
    params: GUS_SUMMARY_PARAMS,
    summary: "Get summary of changes in the REGON database",
};

// ============================================================================
// SECTION: Lookup
// ============================================================================

impl Operation {
    /// Returns the static spec describing this operation.
    #[must_use]
    pub const fn spec(self) -> &'static OperationSpec {
        match self {
            Self::CeidgSearch => &CEIDG_SEARCH,
            Self::CeidgGetFirma => &CEIDG_GET_FIRMA,
            Self::CeidgGetChanges => &CEIDG_GET_CHANGES,
            Self::GusSearch => &GUS_SEARCH,
            Self::GusReport => &GUS_REPORT,
            Self::GusSummary => &GUS_SUMMARY,
        }
    }
}

/// Returns the specs of all operations owned by a registry, in catalog order.
pub fn registry_catalog(registry: Registry) -> impl Iterator<Item = &'static OperationSpec> {
    Operation::for_registry(registry).map(Operation::spec)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
