//! Query-string rendering for scalar and array parameters

use serde_json::Value;

use crate::metadata::CollectionFormat;
use crate::values::param_string;

/// Render one `name=value` query part.
///
/// Array values declared with an array type follow the collection format;
/// `multi` repeats the name, so its output may contain `&`. Values are not
/// percent-encoded.
#[must_use]
pub fn query_part(name: &str, value: &Value, array_typed: bool, format: CollectionFormat) -> String {
    let items = match value {
        Value::Array(items) if array_typed => items,
        _ => return format!("{name}={}", param_string(value)),
    };
    let rendered: Vec<String> = items.iter().map(param_string).collect();
    match format {
        CollectionFormat::Multi => rendered
            .iter()
            .map(|v| format!("{name}={v}"))
            .collect::<Vec<_>>()
            .join("&"),
        other => format!("{name}={}", rendered.join(separator(other))),
    }
}

const fn separator(format: CollectionFormat) -> &'static str {
    match format {
        CollectionFormat::Ssv => " ",
        // literal backslash-t, not a tab character
        CollectionFormat::Tsv => "\\t",
        CollectionFormat::Pipes => "|",
        CollectionFormat::Csv | CollectionFormat::Multi => ",",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn abc() -> Value {
        json!(["a", "b", "c"])
    }

    #[test]
    fn scalar_value() {
        assert_eq!(query_part("page", &json!(2), false, CollectionFormat::Csv), "page=2");
        assert_eq!(query_part("q", &json!("bolt"), false, CollectionFormat::Csv), "q=bolt");
    }

    #[test]
    fn array_formats() {
        assert_eq!(query_part("tags", &abc(), true, CollectionFormat::Csv), "tags=a,b,c");
        assert_eq!(query_part("tags", &abc(), true, CollectionFormat::Ssv), "tags=a b c");
        assert_eq!(query_part("tags", &abc(), true, CollectionFormat::Tsv), r"tags=a\tb\tc");
        assert_eq!(query_part("tags", &abc(), true, CollectionFormat::Pipes), "tags=a|b|c");
        assert_eq!(
            query_part("tags", &abc(), true, CollectionFormat::Multi),
            "tags=a&tags=b&tags=c"
        );
    }

    #[test]
    fn array_value_without_array_type_is_rendered_whole() {
        assert_eq!(
            query_part("tags", &json!([1, 2]), false, CollectionFormat::Pipes),
            "tags=[1,2]"
        );
    }

    #[test]
    fn numeric_items_are_stringified() {
        assert_eq!(query_part("ids", &json!([1, 2]), true, CollectionFormat::Csv), "ids=1,2");
    }

    proptest! {
        #[test]
        fn pipes_joins_every_item(items in prop::collection::vec("[a-z0-9]{1,5}", 1..8)) {
            let value = json!(items);
            let part = query_part("n", &value, true, CollectionFormat::Pipes);
            prop_assert_eq!(part, format!("n={}", items.join("|")));
        }

        #[test]
        fn multi_repeats_the_name(items in prop::collection::vec("[a-z0-9]{1,5}", 1..8)) {
            let value = json!(items);
            let part = query_part("n", &value, true, CollectionFormat::Multi);
            let pairs: Vec<&str> = part.split('&').collect();
            prop_assert_eq!(pairs.len(), items.len());
            for (pair, item) in pairs.iter().zip(&items) {
                prop_assert_eq!(*pair, format!("n={item}"));
            }
        }
    }
}
