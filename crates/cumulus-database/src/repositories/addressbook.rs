//! CardDAV address book and card repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_entity::addressbook::{AddressBook, Card};

/// Repository for `addressbooks` and `cards`.
#[derive(Debug, Clone)]
pub struct CardDavRepository {
    pool: SqlitePool,
}

/// MD5 hex digest used as a card etag.
pub fn card_etag(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

impl CardDavRepository {
    /// Create a new CardDAV repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an address book by principal and uri.
    pub async fn find_address_book(
        &self,
        principal_uri: &str,
        uri: &str,
    ) -> AppResult<Option<AddressBook>> {
        sqlx::query_as::<_, AddressBook>(
            "SELECT * FROM addressbooks WHERE principaluri = ? AND uri = ?",
        )
        .bind(principal_uri)
        .bind(uri)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find address book", e))
    }

    /// Create an address book.
    pub async fn create_address_book(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
        description: &str,
    ) -> AppResult<AddressBook> {
        sqlx::query_as::<_, AddressBook>(
            "INSERT INTO addressbooks (principaluri, displayname, uri, description, synctoken) \
             VALUES (?, ?, ?, ?, 1) RETURNING *",
        )
        .bind(principal_uri)
        .bind(display_name)
        .bind(uri)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create address book", e))
    }

    /// Find a card by uri.
    pub async fn find_card(&self, address_book_id: i64, uri: &str) -> AppResult<Option<Card>> {
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE addressbookid = ? AND uri = ?")
            .bind(address_book_id)
            .bind(uri)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find card", e))
    }

    /// Uri of a card by id.
    pub async fn find_card_uri(&self, card_id: i64) -> AppResult<Option<String>> {
        sqlx::query_scalar("SELECT uri FROM cards WHERE id = ?")
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find card uri", e))
    }

    /// All cards of an address book, ordered by uri.
    pub async fn list_cards(&self, address_book_id: i64) -> AppResult<Vec<Card>> {
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE addressbookid = ? ORDER BY uri")
            .bind(address_book_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list cards", e))
    }

    /// Store a new card and bump the address book's sync token.
    pub async fn create_card(&self, address_book_id: i64, uri: &str, data: &[u8]) -> AppResult<Card> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let card = sqlx::query_as::<_, Card>(
            "INSERT INTO cards (addressbookid, carddata, uri, lastmodified, etag, size) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(address_book_id)
        .bind(data)
        .bind(uri)
        .bind(Utc::now().timestamp())
        .bind(card_etag(data))
        .bind(data.len() as i64)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict(format!("Card '{uri}' already exists"))
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to create card", other),
        })?;

        bump_sync_token(&mut tx, address_book_id).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        debug!(address_book_id, uri = %uri, "Created card");
        Ok(card)
    }

    /// Replace the data of an existing card.
    pub async fn update_card(&self, address_book_id: i64, uri: &str, data: &[u8]) -> AppResult<Card> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let card = sqlx::query_as::<_, Card>(
            "UPDATE cards SET carddata = ?, lastmodified = ?, etag = ?, size = ? \
             WHERE addressbookid = ? AND uri = ? RETURNING *",
        )
        .bind(data)
        .bind(Utc::now().timestamp())
        .bind(card_etag(data))
        .bind(data.len() as i64)
        .bind(address_book_id)
        .bind(uri)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update card", e))?
        .ok_or_else(|| AppError::not_found(format!("Card '{uri}' not found")))?;

        bump_sync_token(&mut tx, address_book_id).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;

        debug!(address_book_id, uri = %uri, "Updated card");
        Ok(card)
    }
}

async fn bump_sync_token(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    address_book_id: i64,
) -> AppResult<()> {
    sqlx::query("UPDATE addressbooks SET synctoken = synctoken + 1 WHERE id = ?")
        .bind(address_book_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump sync token", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;

    #[tokio::test]
    async fn test_card_lifecycle_bumps_sync_token() {
        let db = DatabasePool::in_memory().await.expect("database");
        let repo = CardDavRepository::new(db.pool().clone());
        let book = repo
            .create_address_book("principals/system", "system", "system", "all users")
            .await
            .expect("book");
        assert_eq!(book.sync_token, 1);

        let card = repo
            .create_card(book.id, "Database:bob.vcf", b"BEGIN:VCARD")
            .await
            .expect("card");
        assert_eq!(card.size, 11);
        assert_eq!(card.etag, card_etag(b"BEGIN:VCARD"));
        assert_eq!(
            repo.find_card_uri(card.id).await.expect("uri").as_deref(),
            Some("Database:bob.vcf")
        );

        let updated = repo
            .update_card(book.id, "Database:bob.vcf", b"BEGIN:VCARD\r\n")
            .await
            .expect("update");
        assert_ne!(updated.etag, card.etag);

        let book = repo
            .find_address_book("principals/system", "system")
            .await
            .expect("find")
            .expect("exists");
        assert_eq!(book.sync_token, 3);
        assert!(repo.update_card(book.id, "nope.vcf", b"x").await.unwrap_err().is_not_found());
    }
}
