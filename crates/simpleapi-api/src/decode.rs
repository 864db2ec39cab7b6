// ── Typed decoding of transport payloads ──

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Decode a single object. `None` in, `None` out.
pub fn decode_one<T: DeserializeOwned>(body: Option<Value>) -> Result<Option<T>, Error> {
    body.map(decode).transpose()
}

/// Decode an array of objects. `None` in, `None` out; an empty array stays empty.
pub fn decode_many<T: DeserializeOwned>(body: Option<Value>) -> Result<Option<Vec<T>>, Error> {
    body.map(decode).transpose()
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    // Keep the text around only for the error path.
    let raw = value.to_string();
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: raw,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pet {
        name: String,
        #[serde(default)]
        age: u32,
    }

    #[test]
    fn decodes_single_object() {
        let pet: Option<Pet> = decode_one(Some(json!({ "name": "Rex", "age": 4 }))).unwrap();
        assert_eq!(
            pet,
            Some(Pet {
                name: "Rex".into(),
                age: 4
            })
        );
    }

    #[test]
    fn absent_body_decodes_to_none() {
        assert_eq!(decode_one::<Pet>(None).unwrap(), None);
        assert_eq!(decode_many::<Pet>(None).unwrap(), None);
    }

    #[test]
    fn empty_array_stays_empty() {
        let pets: Option<Vec<Pet>> = decode_many(Some(json!([]))).unwrap();
        assert_eq!(pets, Some(Vec::new()));
    }

    #[test]
    fn shape_mismatch_is_a_deserialization_error() {
        let err = decode_many::<Pet>(Some(json!({ "name": "Rex" }))).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
