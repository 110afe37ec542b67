//! Debug dumps of the constant tables as JSON. Read-only: unready slots
//! render as `null` placeholders rather than being forced.

use serde_json::{json, Map, Value as JsonValue};

use crate::table::{arrays, strings, variants};
use crate::value::{ArrayKey, ConstVariant, StaticArray, StaticText};

fn text_to_json(text: &StaticText) -> JsonValue {
    match text.as_str() {
        Some(s) => JsonValue::String(s.to_owned()),
        // Non-UTF-8 byte strings dump as byte arrays.
        None => {
            let bytes: Vec<JsonValue> = text.as_bytes().iter().copied().map(JsonValue::from).collect();
            JsonValue::Array(bytes)
        }
    }
}

fn variant_to_json(value: &ConstVariant) -> JsonValue {
    match value {
        ConstVariant::Null => JsonValue::Null,
        ConstVariant::Bool(v) => JsonValue::Bool(*v),
        ConstVariant::Int(v) => json!(*v),
        ConstVariant::Float(v) => json!(*v),
        ConstVariant::Text(text) => text_to_json(text),
        ConstVariant::Array(array) => array_to_json(array),
    }
}

fn array_to_json(array: &StaticArray) -> JsonValue {
    // Entries dump as [key, value] pairs to keep declaration order.
    let entries: Vec<JsonValue> = array
        .iter()
        .map(|(key, value)| {
            let key_json = match key {
                ArrayKey::Int(v) => json!(*v),
                ArrayKey::Text(s) => JsonValue::String(s.to_string()),
            };
            JsonValue::Array(vec![key_json, variant_to_json(value)])
        })
        .collect();
    JsonValue::Array(entries)
}

/// Registered-versus-ready counts for each table.
pub fn readiness() -> JsonValue {
    json!({
        "strings": { "registered": strings().len(), "ready": strings().ready_count() },
        "arrays": { "registered": arrays().len(), "ready": arrays().ready_count() },
        "variants": { "registered": variants().len(), "ready": variants().ready_count() },
    })
}

/// A human-readable dump of all three tables keyed by hex content key,
/// plus the readiness summary.
pub fn snapshot() -> JsonValue {
    let mut string_map = Map::new();
    for (key, slot) in strings().slots_sorted() {
        let rendered = slot.try_get().map_or(JsonValue::Null, text_to_json);
        string_map.insert(key.to_string(), rendered);
    }

    let mut array_map = Map::new();
    for (key, slot) in arrays().slots_sorted() {
        let rendered = slot.try_get().map_or(JsonValue::Null, array_to_json);
        array_map.insert(key.to_string(), rendered);
    }

    let mut variant_map = Map::new();
    for (key, slot) in variants().slots_sorted() {
        let rendered = slot.try_get().map_or(JsonValue::Null, variant_to_json);
        variant_map.insert(key.to_string(), rendered);
    }

    json!({
        "strings": JsonValue::Object(string_map),
        "arrays": JsonValue::Object(array_map),
        "variants": JsonValue::Object(variant_map),
        "readiness": readiness(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TextSpec, VariantSpec};

    #[test]
    fn snapshot_renders_ready_strings_and_null_placeholders() {
        let ready = strings().intern(TextSpec::from("snapshot ready"));
        ready.get();
        let pending = strings().intern(TextSpec::from("snapshot pending"));

        let dump = snapshot();
        let table = dump["strings"].as_object().expect("strings object");
        assert_eq!(
            table[&ready.key().to_string()],
            JsonValue::String("snapshot ready".to_owned())
        );
        assert_eq!(table[&pending.key().to_string()], JsonValue::Null);
    }

    #[test]
    fn readiness_counts_registered_and_ready() {
        let slot = variants().intern(VariantSpec::Int(0x5aa9));
        slot.get();

        let summary = readiness();
        let registered = summary["variants"]["registered"].as_u64().expect("count");
        let ready = summary["variants"]["ready"].as_u64().expect("count");
        assert!(registered >= 1);
        assert!(ready >= 1);
        assert!(ready <= registered);
    }

    #[test]
    fn variant_snapshot_inlines_referenced_text() {
        let text = strings().intern(TextSpec::from("snapshot element"));
        let slot = variants().intern(VariantSpec::Text(text.key()));
        slot.get();

        let dump = snapshot();
        assert_eq!(
            dump["variants"][slot.key().to_string()],
            JsonValue::String("snapshot element".to_owned())
        );
    }
}
