//! Search and sort over a loaded item list.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use stockroom_core::DomainError;
use stockroom_inventory::InventoryItem;

/// List ordering offered to the user.
///
/// Parses from the option values `Alpha`, `QLTH`, and `QHTL`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortMode {
    /// By name, ascending.
    #[default]
    Alpha,
    /// By quantity, low to high.
    QuantityLowToHigh,
    /// By quantity, high to low.
    QuantityHighToLow,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Alpha => "Alpha",
            SortMode::QuantityLowToHigh => "QLTH",
            SortMode::QuantityHighToLow => "QHTL",
        }
    }

    fn compare(self, a: &InventoryItem, b: &InventoryItem) -> Ordering {
        // Names are stored lowercase, so comparing them is case-insensitive.
        let by_name = a.name.cmp(&b.name);
        match self {
            SortMode::Alpha => by_name,
            SortMode::QuantityLowToHigh => a.quantity.cmp(&b.quantity).then(by_name),
            SortMode::QuantityHighToLow => b.quantity.cmp(&a.quantity).then(by_name),
        }
    }
}

impl core::str::FromStr for SortMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALPHA" => Ok(SortMode::Alpha),
            "QLTH" => Ok(SortMode::QuantityLowToHigh),
            "QHTL" => Ok(SortMode::QuantityHighToLow),
            _ => Err(DomainError::validation(format!(
                "unknown sort mode {s:?} (expected Alpha, QLTH, or QHTL)"
            ))),
        }
    }
}

impl TryFrom<String> for SortMode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortMode> for String {
    fn from(value: SortMode) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for SortMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Items whose name contains `query` (case-insensitive), ordered by `mode`.
///
/// An empty query matches everything. Ties on quantity fall back to name.
pub fn filter_and_sort(items: &[InventoryItem], query: &str, mode: SortMode) -> Vec<InventoryItem> {
    let needle = query.to_lowercase();
    let mut out: Vec<InventoryItem> = items
        .iter()
        .filter(|item| item.name.as_str().contains(needle.as_str()))
        .cloned()
        .collect();
    out.sort_by(|a, b| mode.compare(a, b));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_inventory::{ItemName, Quantity};

    fn item(name: &str, quantity: u64) -> InventoryItem {
        InventoryItem::new(ItemName::parse(name).unwrap(), Quantity::new(quantity).unwrap())
    }

    fn names(items: &[InventoryItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    fn pantry() -> Vec<InventoryItem> {
        vec![
            item("tomato", 3),
            item("Apple", 5),
            item("green apple", 1),
            item("basil", 2),
        ]
    }

    #[test]
    fn empty_query_alpha_returns_everything_by_name() {
        let out = filter_and_sort(&pantry(), "", SortMode::Alpha);
        assert_eq!(names(&out), vec!["apple", "basil", "green apple", "tomato"]);
    }

    #[test]
    fn query_filters_case_insensitively_then_sorts_by_quantity() {
        let out = filter_and_sort(&pantry(), "APPLE", SortMode::QuantityLowToHigh);
        assert_eq!(names(&out), vec!["green apple", "apple"]);

        let out = filter_and_sort(&pantry(), "apple", SortMode::QuantityHighToLow);
        assert_eq!(names(&out), vec!["apple", "green apple"]);
    }

    #[test]
    fn quantity_ties_fall_back_to_name() {
        let items = vec![item("b", 2), item("a", 2), item("c", 1)];
        let out = filter_and_sort(&items, "", SortMode::QuantityHighToLow);
        assert_eq!(names(&out), vec!["a", "b", "c"]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter_and_sort(&pantry(), "zucchini", SortMode::Alpha).is_empty());
    }

    #[test]
    fn sort_mode_parses_option_values() {
        assert_eq!("Alpha".parse::<SortMode>().unwrap(), SortMode::Alpha);
        assert_eq!("qlth".parse::<SortMode>().unwrap(), SortMode::QuantityLowToHigh);
        assert_eq!("QHTL".parse::<SortMode>().unwrap(), SortMode::QuantityHighToLow);
        assert!(matches!("size".parse::<SortMode>(), Err(DomainError::Validation(_))));
        assert_eq!(SortMode::default(), SortMode::Alpha);
        assert_eq!(SortMode::QuantityLowToHigh.to_string(), "QLTH");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn items_strategy() -> impl Strategy<Value = Vec<InventoryItem>> {
            proptest::collection::btree_map("[a-z]{1,8}", 1u64..50, 0..20).prop_map(|m| {
                m.into_iter().map(|(n, q)| item(&n, q)).collect()
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 300,
                ..ProptestConfig::default()
            })]

            /// Property: every result matches the query and nothing matching is dropped.
            #[test]
            fn filter_is_exact(items in items_strategy(), query in "[a-zA-Z]{0,2}") {
                let out = filter_and_sort(&items, &query, SortMode::Alpha);
                let needle = query.to_lowercase();
                let expected = items.iter().filter(|i| i.name.as_str().contains(&needle)).count();
                prop_assert_eq!(out.len(), expected);
                prop_assert!(out.iter().all(|i| i.name.as_str().contains(&needle)));
            }

            /// Property: each mode yields a correctly ordered list.
            #[test]
            fn output_is_ordered(items in items_strategy()) {
                let alpha = filter_and_sort(&items, "", SortMode::Alpha);
                prop_assert!(alpha.windows(2).all(|w| w[0].name <= w[1].name));

                let low = filter_and_sort(&items, "", SortMode::QuantityLowToHigh);
                prop_assert!(low.windows(2).all(|w| w[0].quantity <= w[1].quantity));

                let high = filter_and_sort(&items, "", SortMode::QuantityHighToLow);
                prop_assert!(high.windows(2).all(|w| w[0].quantity >= w[1].quantity));
            }
        }
    }
}
