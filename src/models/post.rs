use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Post — A JSONPlaceholder post, the raw material for fabricated products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub title: String,
    pub body: String,
}
