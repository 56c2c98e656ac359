//! Serde helpers for fields whose serialized form must not depend on
//! iteration order.

/// Serialize a set (or any collection) as a sequence sorted by element order.
///
/// Two sets holding the same elements then produce the same JSON text, which
/// makes [`JsonCodec::equals_serialized`](crate::JsonCodec::equals_serialized)
/// order-insensitive for the field. Deserialization is the collection's own.
///
/// ```
/// use indexmap::IndexSet;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Tags {
///     #[serde(with = "siloxane_core::serde_helpers::sorted_seq")]
///     tags: IndexSet<String>,
/// }
/// ```
pub mod sorted_seq {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<'a, C, T, S>(collection: &'a C, serializer: S) -> Result<S::Ok, S::Error>
    where
        &'a C: IntoIterator<Item = &'a T>,
        T: Ord + Serialize + 'a,
        S: Serializer,
    {
        let mut items: Vec<&T> = collection.into_iter().collect();
        items.sort();
        serializer.collect_seq(items)
    }

    pub fn deserialize<'de, C, D>(deserializer: D) -> Result<C, D::Error>
    where
        C: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        C::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;
    use std::collections::HashSet;

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Labels {
        #[serde(with = "sorted_seq")]
        labels: IndexSet<String>,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Numbers {
        #[serde(with = "sorted_seq")]
        numbers: HashSet<i32>,
    }

    fn labels(items: &[&str]) -> Labels {
        Labels {
            labels: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn sorted_seq_ignores_insertion_order() {
        let a = serde_json::to_string(&labels(&["b", "c", "a"])).unwrap();
        let b = serde_json::to_string(&labels(&["c", "a", "b"])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, r#"{"labels":["a","b","c"]}"#);
    }

    #[test]
    fn sorted_seq_roundtrip() {
        let original = Numbers {
            numbers: [5, 1, 3].into_iter().collect(),
        };
        let text = serde_json::to_string(&original).unwrap();
        assert_eq!(text, r#"{"numbers":[1,3,5]}"#);

        let recovered: Numbers = serde_json::from_str(&text).unwrap();
        assert_eq!(recovered, original);
    }
}
