//! Address book and card models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An address book owned by a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AddressBook {
    /// Row id.
    pub id: i64,
    /// Owning principal, e.g. `principals/system`.
    #[sqlx(rename = "principaluri")]
    pub principal_uri: String,
    /// Display name.
    #[sqlx(rename = "displayname")]
    pub display_name: Option<String>,
    /// Uri within the principal's home.
    pub uri: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Incremented on every card change.
    #[sqlx(rename = "synctoken")]
    pub sync_token: i64,
}

/// A single vCard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Card {
    /// Row id.
    pub id: i64,
    /// Containing address book.
    #[sqlx(rename = "addressbookid")]
    pub address_book_id: i64,
    /// Card uri, e.g. `Database:alice.vcf`.
    pub uri: String,
    /// Raw vCard text.
    #[sqlx(rename = "carddata")]
    pub card_data: Vec<u8>,
    /// Unix time of the last change.
    #[sqlx(rename = "lastmodified")]
    pub last_modified: i64,
    /// MD5 hex digest of the data.
    pub etag: String,
    /// Length of the data in bytes.
    pub size: i64,
}
