use serde::{Deserialize, Serialize};

/// One cat fact as returned by the fact endpoint. Unknown response fields
/// (e.g. the advertised text length) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPayload {
    pub fact: String,
}

/// One entry of the random-image endpoint's response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub url: String,
}
