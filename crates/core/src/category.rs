use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Bumped whenever an entry in either table is added, removed or remapped.
pub const TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardCategory {
    Income,
    Advertising,
    Contractors,
    Insurance,
    #[serde(rename = "Legal & Professional")]
    LegalProfessional,
    #[serde(rename = "Office Expenses")]
    OfficeExpenses,
    #[serde(rename = "Rent & Utilities")]
    RentUtilities,
    #[serde(rename = "Travel & Meals")]
    TravelMeals,
    #[serde(rename = "Other Expenses")]
    OtherExpenses,
    Uncategorized,
    Transfer,
    Payment,
    Equity,
}

impl StandardCategory {
    pub const ALL: [StandardCategory; 13] = [
        StandardCategory::Income,
        StandardCategory::Advertising,
        StandardCategory::Contractors,
        StandardCategory::Insurance,
        StandardCategory::LegalProfessional,
        StandardCategory::OfficeExpenses,
        StandardCategory::RentUtilities,
        StandardCategory::TravelMeals,
        StandardCategory::OtherExpenses,
        StandardCategory::Uncategorized,
        StandardCategory::Transfer,
        StandardCategory::Payment,
        StandardCategory::Equity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StandardCategory::Income => "Income",
            StandardCategory::Advertising => "Advertising",
            StandardCategory::Contractors => "Contractors",
            StandardCategory::Insurance => "Insurance",
            StandardCategory::LegalProfessional => "Legal & Professional",
            StandardCategory::OfficeExpenses => "Office Expenses",
            StandardCategory::RentUtilities => "Rent & Utilities",
            StandardCategory::TravelMeals => "Travel & Meals",
            StandardCategory::OtherExpenses => "Other Expenses",
            StandardCategory::Uncategorized => "Uncategorized",
            StandardCategory::Transfer => "Transfer",
            StandardCategory::Payment => "Payment",
            StandardCategory::Equity => "Equity",
        }
    }

    /// Internal movements and owner transactions, kept out of business totals.
    pub fn is_non_business(self) -> bool {
        matches!(
            self,
            StandardCategory::Transfer | StandardCategory::Payment | StandardCategory::Equity
        )
    }
}

impl fmt::Display for StandardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for StandardCategory {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StandardCategory::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| MappingError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Unknown standard category: '{0}'")]
    UnknownCategory(String),
}

pub const STANDARD_CATEGORIES: &[(&str, StandardCategory)] = &[
    ("Sales", StandardCategory::Income),
    ("Service Income", StandardCategory::Income),
    ("Consulting Income", StandardCategory::Income),
    ("Revenue", StandardCategory::Income),
    ("Advertising & Promotion", StandardCategory::Advertising),
    ("Marketing", StandardCategory::Advertising),
    ("Web Hosting", StandardCategory::Advertising),
    ("Computer – Hosting", StandardCategory::OfficeExpenses),
    ("Contractors", StandardCategory::Contractors),
    ("Subcontractors", StandardCategory::Contractors),
    ("Insurance", StandardCategory::Insurance),
    ("Business Insurance", StandardCategory::Insurance),
    ("Legal & Professional Services", StandardCategory::LegalProfessional),
    ("Legal Fees", StandardCategory::LegalProfessional),
    ("Accounting Fees", StandardCategory::LegalProfessional),
    ("Office Expenses", StandardCategory::OfficeExpenses),
    ("Office Supplies", StandardCategory::OfficeExpenses),
    ("Software", StandardCategory::OfficeExpenses),
    ("Computer – Hardware", StandardCategory::OfficeExpenses),
    ("Computer – Software", StandardCategory::OfficeExpenses),
    ("Rent", StandardCategory::RentUtilities),
    ("Utilities", StandardCategory::RentUtilities),
    ("Telephone", StandardCategory::RentUtilities),
    ("Internet", StandardCategory::RentUtilities),
    ("Computer – Internet", StandardCategory::RentUtilities),
    ("Telephone – Wireless", StandardCategory::RentUtilities),
    ("Travel", StandardCategory::TravelMeals),
    ("Airfare", StandardCategory::TravelMeals),
    ("Meals", StandardCategory::TravelMeals),
    ("Client Meals", StandardCategory::TravelMeals),
    ("Dues & Subscriptions", StandardCategory::OtherExpenses),
    ("Education & Training", StandardCategory::OtherExpenses),
    ("Bank Service Charges", StandardCategory::OtherExpenses),
    // Non-taxable
    ("Transfer", StandardCategory::Transfer),
    ("Payment", StandardCategory::Payment),
    ("Credit Card Payment", StandardCategory::Payment),
    ("Owner Investment", StandardCategory::Equity),
    ("Owner Investment / Drawings", StandardCategory::Equity),
    ("Owner's Draw", StandardCategory::Equity),
    ("Owner Draw", StandardCategory::Equity),
    ("Personal Expense", StandardCategory::Equity),
];

/// TXF reference numbers. Opaque to this crate; only the import tool reads them.
pub const EXPORT_CODES: &[(&str, u32)] = &[
    ("Sales", 266),
    ("Service Income", 266),
    ("Consulting Income", 266),
    ("Revenue", 266),
    ("Gross Receipts", 266),
    ("Uncategorized Income", 266),
    ("Advertising & Promotion", 271),
    ("Marketing", 271),
    ("Web Hosting", 271),
    ("Computer – Hosting", 271),
    ("Vehicle Expenses", 270),
    ("Gas & Fuel", 270),
    ("Commissions", 272),
    ("Contractors", 367),
    ("Subcontractors", 367),
    ("Insurance", 275),
    ("Business Insurance", 275),
    ("Liability Insurance", 275),
    ("Interest Expense", 276),
    ("Credit Card Interest", 276),
    ("Legal & Professional Services", 277),
    ("Legal Fees", 277),
    ("Accounting Fees", 277),
    ("Consulting Fees", 277),
    ("Office Expenses", 278),
    ("Office Supplies", 278),
    ("Postage", 278),
    ("Shipping", 278),
    ("Software", 278),
    ("Computer – Hardware", 278),
    ("Computer – Software", 278),
    ("Small Tools & Equipment", 278),
    ("Rent", 281),
    ("Equipment Rental", 280),
    ("Repairs & Maintenance", 282),
    ("Taxes & Licenses", 286),
    ("State Taxes", 286),
    ("Permits", 286),
    ("Travel", 283),
    ("Airfare", 283),
    ("Hotel", 283),
    ("Taxi & Rideshare", 283),
    ("Meals", 284),
    ("Meals & Entertainment", 284),
    ("Client Meals", 284),
    ("Utilities", 287),
    ("Telephone", 287),
    ("Mobile Phone", 287),
    ("Internet", 287),
    ("Computer – Internet", 287),
    ("Telephone – Wireless", 287),
    ("Dues & Subscriptions", 298),
    ("Education & Training", 298),
    ("Conferences", 298),
    ("Bank Service Charges", 298),
    ("Merchant Fees", 298),
    ("Uniforms", 298),
    ("Gifts", 298),
];

static BUILTIN: Lazy<CategoryMapper> =
    Lazy::new(|| CategoryMapper::from_tables(STANDARD_CATEGORIES, EXPORT_CODES));

/// An ordered lookup table with exact, case-sensitive keys.
#[derive(Debug, Clone)]
struct Table<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T: Copy> Table<T> {
    fn get(&self, key: &str) -> Option<T> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    fn set(&mut self, key: &str, value: T) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }
}

impl<T: Copy> FromIterator<(String, T)> for Table<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut table = Table {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (k, v) in iter {
            table.set(&k, v);
        }
        table
    }
}

/// Maps raw export category names to standard tax categories and TXF codes.
///
/// The two tables are independent: a name can carry an export code without a
/// standard category (it then standardizes to `Uncategorized`) and vice versa.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    standard: Table<StandardCategory>,
    export: Table<u32>,
}

impl CategoryMapper {
    pub fn builtin() -> &'static CategoryMapper {
        &BUILTIN
    }

    pub fn from_tables(standard: &[(&str, StandardCategory)], export: &[(&str, u32)]) -> Self {
        CategoryMapper {
            standard: standard.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            export: export.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// Copy of this mapper with hand-maintained entries added or replaced.
    /// Category values are standard category labels, e.g. `"Office Expenses"`.
    pub fn with_overrides(
        &self,
        categories: &BTreeMap<String, String>,
        export_codes: &BTreeMap<String, u32>,
    ) -> Result<CategoryMapper, MappingError> {
        let mut mapper = self.clone();
        for (raw, label) in categories {
            mapper.standard.set(raw, label.parse()?);
        }
        for (raw, code) in export_codes {
            mapper.export.set(raw, *code);
        }
        Ok(mapper)
    }

    /// Never fails; unknown names are `Uncategorized`.
    pub fn standard_category(&self, raw: &str) -> StandardCategory {
        self.standard
            .get(raw)
            .unwrap_or(StandardCategory::Uncategorized)
    }

    pub fn export_code(&self, raw: &str) -> Option<u32> {
        self.export.get(raw)
    }

    pub fn has_export_code(&self, raw: &str) -> bool {
        self.export_code(raw).is_some()
    }

    pub fn standard_entries(&self) -> impl Iterator<Item = (&str, StandardCategory)> {
        self.standard.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn export_entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.export.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

pub fn standard_category(raw: &str) -> StandardCategory {
    CategoryMapper::builtin().standard_category(raw)
}

pub fn export_code(raw: &str) -> Option<u32> {
    CategoryMapper::builtin().export_code(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_standard_categories() {
        assert_eq!(standard_category("Sales"), StandardCategory::Income);
        assert_eq!(standard_category("Rent"), StandardCategory::RentUtilities);
        assert_eq!(standard_category("Computer – Hosting"), StandardCategory::OfficeExpenses);
        assert_eq!(standard_category("Owner Investment / Drawings"), StandardCategory::Equity);
        assert_eq!(standard_category("Credit Card Payment"), StandardCategory::Payment);
    }

    #[test]
    fn unknown_name_is_uncategorized() {
        assert_eq!(standard_category("Connecticut"), StandardCategory::Uncategorized);
        assert_eq!(standard_category(""), StandardCategory::Uncategorized);
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        assert_eq!(standard_category("sales"), StandardCategory::Uncategorized);
        assert_eq!(standard_category("Sales "), StandardCategory::Uncategorized);
        // Hyphen instead of the en dash used by the export.
        assert_eq!(standard_category("Computer - Hosting"), StandardCategory::Uncategorized);
        assert_eq!(export_code("rent"), None);
    }

    #[test]
    fn export_codes() {
        assert_eq!(export_code("Rent"), Some(281));
        assert_eq!(export_code("Sales"), Some(266));
        assert_eq!(export_code("Contractors"), Some(367));
        assert_eq!(export_code("Computer – Hosting"), Some(271));
        assert_eq!(export_code("Owner Investment / Drawings"), None);
        assert_eq!(export_code("Uncategorized"), None);
    }

    #[test]
    fn tables_are_independent() {
        // Export code without a standard category.
        assert_eq!(export_code("Gross Receipts"), Some(266));
        assert_eq!(standard_category("Gross Receipts"), StandardCategory::Uncategorized);
        // Standard category without an export code.
        assert_eq!(standard_category("Transfer"), StandardCategory::Transfer);
        assert_eq!(export_code("Transfer"), None);
    }

    #[test]
    fn builtin_tables_have_no_duplicate_keys() {
        let mapper = CategoryMapper::builtin();
        assert_eq!(mapper.standard_entries().count(), STANDARD_CATEGORIES.len());
        assert_eq!(mapper.export_entries().count(), EXPORT_CODES.len());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for category in StandardCategory::ALL {
            assert_eq!(category.label().parse::<StandardCategory>().unwrap(), category);
        }
        assert!("Meals".parse::<StandardCategory>().is_err());
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&StandardCategory::LegalProfessional).unwrap();
        assert_eq!(json, "\"Legal & Professional\"");
        let back: StandardCategory = serde_json::from_str("\"Rent & Utilities\"").unwrap();
        assert_eq!(back, StandardCategory::RentUtilities);
    }

    #[test]
    fn non_business_categories() {
        assert!(StandardCategory::Transfer.is_non_business());
        assert!(StandardCategory::Payment.is_non_business());
        assert!(StandardCategory::Equity.is_non_business());
        assert!(!StandardCategory::Income.is_non_business());
        assert!(!StandardCategory::Uncategorized.is_non_business());
    }

    #[test]
    fn overrides_add_and_replace_entries() {
        let mut categories = BTreeMap::new();
        categories.insert("Hosting".to_string(), "Office Expenses".to_string());
        categories.insert("Rent".to_string(), "Other Expenses".to_string());
        let mut codes = BTreeMap::new();
        codes.insert("Hosting".to_string(), 278);

        let mapper = CategoryMapper::builtin()
            .with_overrides(&categories, &codes)
            .unwrap();
        assert_eq!(mapper.standard_category("Hosting"), StandardCategory::OfficeExpenses);
        assert_eq!(mapper.standard_category("Rent"), StandardCategory::OtherExpenses);
        assert_eq!(mapper.export_code("Hosting"), Some(278));
        // Replacing keeps the original position.
        let rent_pos = mapper.standard_entries().position(|(k, _)| k == "Rent");
        assert_eq!(rent_pos, STANDARD_CATEGORIES.iter().position(|(k, _)| *k == "Rent"));
        // The shared mapper is untouched.
        assert_eq!(standard_category("Hosting"), StandardCategory::Uncategorized);
    }

    #[test]
    fn override_with_unknown_label_is_rejected() {
        let mut categories = BTreeMap::new();
        categories.insert("Hosting".to_string(), "Servers".to_string());
        let err = CategoryMapper::builtin()
            .with_overrides(&categories, &BTreeMap::new())
            .unwrap_err();
        assert_eq!(err, MappingError::UnknownCategory("Servers".to_string()));
    }
}
