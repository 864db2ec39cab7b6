// ── Record trait ──

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value decoded from the wire and persisted under a stable identity.
///
/// The field mapping is whatever the type's serde derive says it is. Each
/// record type owns one storage namespace (`KIND`) and exactly one identity
/// field, surfaced by [`identity`](Self::identity). Saving a record whose
/// identity already exists replaces the stored value.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use simpleapi_core::Record;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Pet {
///     name: String,
///     #[serde(rename = "type")]
///     kind: String,
///     age: u32,
/// }
///
/// impl Record for Pet {
///     const KIND: &'static str = "pet";
///
///     fn identity(&self) -> String {
///         self.name.clone()
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Storage namespace for this record type.
    const KIND: &'static str;

    /// Value of the identity field.
    fn identity(&self) -> String;
}
