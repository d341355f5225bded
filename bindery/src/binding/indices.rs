//! Element index resolution for collection and dictionary binding.

use crate::source::SourceValue;

/// The explicit index list supplied in the input, if any.
///
/// Absent raw value and an empty list are treated identically: `None`,
/// meaning "synthesize zero-based indices instead".
pub fn explicit_index_names(index_value: Option<&SourceValue>) -> Option<Vec<String>> {
    let names = index_value?.to_strings().to_vec();
    if names.is_empty() { None } else { Some(names) }
}

/// The unbounded ascending index sequence: "0", "1", "2", …
///
/// The iterator never terminates on its own; consumers must impose their own
/// stopping condition, typically "stop at the first index the value source
/// has nothing for".
pub fn zero_based_index_names() -> impl Iterator<Item = String> {
    (0u64..).map(|i| i.to_string())
}

/// The name an element at `index` binds under.
///
/// `items` + `0` → `items[0]`; under the empty prefix the index stands on
/// its own: `` + `0` → `0`.
pub fn index_model_name(prefix: &str, index: &str) -> String {
    if prefix.is_empty() {
        index.to_owned()
    } else {
        format!("{prefix}[{index}]")
    }
}

/// The name the companion explicit-index list lives under.
pub fn index_list_name(prefix: &str) -> String {
    if prefix.is_empty() {
        "index".to_owned()
    } else {
        format!("{prefix}.index")
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn absent_and_empty_index_lists_are_equivalent() {
        assert_eq!(explicit_index_names(None), None);
        let empty = SourceValue::multi(Vec::<String>::new());
        assert_eq!(explicit_index_names(Some(&empty)), None);
    }

    #[test]
    fn explicit_indices_keep_their_supplied_order() {
        let value = SourceValue::multi(["b", "a", "b"]);
        assert_eq!(
            explicit_index_names(Some(&value)),
            Some(vec!["b".to_string(), "a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn zero_based_indices_count_up_from_zero() {
        let first_five = zero_based_index_names().take(5).collect_vec();
        assert_eq!(first_five, ["0", "1", "2", "3", "4"]);
        // Consumption well past any plausible bound still produces values.
        assert_eq!(zero_based_index_names().nth(10_000), Some("10000".to_string()));
    }

    #[test]
    fn index_names_nest_under_the_prefix() {
        assert_eq!(index_model_name("items", "3"), "items[3]");
        assert_eq!(index_model_name("", "3"), "3");
        assert_eq!(index_list_name("items"), "items.index");
        assert_eq!(index_list_name(""), "index");
    }
}
