use serde::Serialize;

use super::group::GroupingStrategy;

/// Optional rows an entry block may carry beyond the fixed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionalField {
    Method,
    Area,
    Reentry,
    Consent,
}

impl OptionalField {
    pub const ALL: [OptionalField; 4] = [
        OptionalField::Method,
        OptionalField::Area,
        OptionalField::Reentry,
        OptionalField::Consent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OptionalField::Method => "Method",
            OptionalField::Area => "Area Treated",
            OptionalField::Reentry => "Re-entry Interval",
            OptionalField::Consent => "Customer Consent",
        }
    }
}

/// Static description of a jurisdiction's report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JurisdictionPolicy {
    pub code: &'static str,
    pub name: &'static str,
    pub form_title: &'static str,
    pub grouping: GroupingStrategy,
    /// Rendered in this order after the fixed rows of each entry.
    pub optional_fields: &'static [OptionalField],
}

impl JurisdictionPolicy {
    pub fn shows(&self, field: OptionalField) -> bool {
        self.optional_fields.contains(&field)
    }
}

pub const JURISDICTIONS: &[JurisdictionPolicy] = &[
    JurisdictionPolicy {
        code: "CA",
        name: "California",
        form_title: "Monthly Pesticide Use Report",
        grouping: GroupingStrategy::ByCustomer,
        optional_fields: &[OptionalField::Method, OptionalField::Area, OptionalField::Reentry],
    },
    JurisdictionPolicy {
        code: "TX",
        name: "Texas",
        form_title: "Structural Pest Control Application Record",
        grouping: GroupingStrategy::ByDate,
        optional_fields: &[OptionalField::Method, OptionalField::Area, OptionalField::Consent],
    },
    JurisdictionPolicy {
        code: "FL",
        name: "Florida",
        form_title: "Pesticide Application Record",
        grouping: GroupingStrategy::ByDate,
        optional_fields: &[OptionalField::Area, OptionalField::Reentry],
    },
];

/// Case-insensitive lookup into the jurisdiction table.
pub fn lookup(code: &str) -> Option<&'static JurisdictionPolicy> {
    let code = code.trim();
    JURISDICTIONS.iter().find(|p| p.code.eq_ignore_ascii_case(code))
}
