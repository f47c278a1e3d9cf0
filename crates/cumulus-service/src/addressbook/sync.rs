//! Synchronises every user into the system address book.

use std::sync::Arc;

use calcard::common::Data;
use calcard::vcard::{
    VCard, VCardEntry, VCardParameter, VCardProperty, VCardType, VCardValue, VCardVersion,
};
use serde::Serialize;
use tracing::{debug, info};

use cumulus_core::error::{AppError, ErrorKind};
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::PageRequest;
use cumulus_database::repositories::{CardDavRepository, UserRepository};
use cumulus_entity::addressbook::AddressBook;
use cumulus_entity::user::User;

/// Principal owning the system address book.
pub const SYSTEM_PRINCIPAL: &str = "principals/system";
/// Uri of the system address book.
pub const SYSTEM_ADDRESS_BOOK_URI: &str = "system";
const SYSTEM_DESCRIPTION: &str = "System addressbook which holds all users of this instance";
const PAGE_SIZE: u64 = 50;

/// Outcome of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Cards written for users without one.
    pub created: u64,
    /// Cards rewritten because the display name changed.
    pub updated: u64,
    /// Cards left as they were.
    pub unchanged: u64,
}

impl SyncReport {
    /// Number of users visited.
    pub fn total(&self) -> u64 {
        self.created + self.updated + self.unchanged
    }
}

/// Keeps the system address book in step with the user list.
#[derive(Debug, Clone)]
pub struct AddressBookSync {
    users: Arc<UserRepository>,
    cards: Arc<CardDavRepository>,
}

impl AddressBookSync {
    /// Creates a new sync service.
    pub fn new(users: Arc<UserRepository>, cards: Arc<CardDavRepository>) -> Self {
        Self { users, cards }
    }

    /// The system address book, created on first use.
    pub async fn ensure_system_address_book(&self) -> AppResult<AddressBook> {
        if let Some(book) = self
            .cards
            .find_address_book(SYSTEM_PRINCIPAL, SYSTEM_ADDRESS_BOOK_URI)
            .await?
        {
            return Ok(book);
        }
        let book = self
            .cards
            .create_address_book(
                SYSTEM_PRINCIPAL,
                SYSTEM_ADDRESS_BOOK_URI,
                SYSTEM_ADDRESS_BOOK_URI,
                SYSTEM_DESCRIPTION,
            )
            .await?;
        info!(address_book_id = book.id, "Created system address book");
        Ok(book)
    }

    /// Write or refresh a card for every user. `progress` is called once
    /// per user.
    pub async fn sync_system_address_book<F>(&self, mut progress: F) -> AppResult<SyncReport>
    where
        F: FnMut(&User),
    {
        let book = self.ensure_system_address_book().await?;
        let mut report = SyncReport::default();
        let mut offset = 0;

        loop {
            let users = self.users.list(&PageRequest::new(PAGE_SIZE, offset)).await?;
            if users.is_empty() {
                break;
            }
            offset += users.len() as u64;

            for user in &users {
                self.sync_user(book.id, user, &mut report).await?;
                progress(user);
            }
        }

        info!(
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            "System address book synchronised"
        );
        Ok(report)
    }

    async fn sync_user(&self, book_id: i64, user: &User, report: &mut SyncReport) -> AppResult<()> {
        let uri = card_uri_for(user);
        let display_name = user.display_name_or_uid();

        let existing = self.cards.find_card(book_id, &uri).await?;
        if let Some(existing) = &existing {
            let card = parse_card(&existing.card_data)?;
            if formatted_name(&card) == Some(display_name) {
                report.unchanged += 1;
                return Ok(());
            }
        }

        let data = write_card(&card_for_user(user))?;
        if existing.is_some() {
            self.cards.update_card(book_id, &uri, data.as_bytes()).await?;
            debug!(uid = %user.uid, uri = %uri, "Updated contact card");
            report.updated += 1;
        } else {
            self.cards.create_card(book_id, &uri, data.as_bytes()).await?;
            debug!(uid = %user.uid, uri = %uri, "Created contact card");
            report.created += 1;
        }
        Ok(())
    }

    /// Uri of a stored card.
    pub async fn get_card_uri(&self, card_id: i64) -> AppResult<String> {
        self.cards
            .find_card_uri(card_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Card {card_id} not found")))
    }
}

/// Card uri of a user: `{backend}:{uid}.vcf`.
pub fn card_uri_for(user: &User) -> String {
    format!("{}:{}.vcf", user.backend, user.uid)
}

fn text_entry(name: VCardProperty, value: &str) -> VCardEntry {
    VCardEntry {
        group: None,
        name,
        params: Vec::new(),
        values: vec![VCardValue::Text(value.to_string())],
    }
}

/// The contact card of a user: UID, FN and the avatar as an inline PHOTO.
pub fn card_for_user(user: &User) -> VCard {
    let mut entries = vec![
        text_entry(VCardProperty::Uid, &user.uid),
        text_entry(VCardProperty::Fn, user.display_name_or_uid()),
    ];
    if let Some((mime, data)) = user.avatar() {
        entries.push(VCardEntry {
            group: None,
            name: VCardProperty::Photo,
            params: vec![VCardParameter::Type(vec![VCardType::Other(mime.to_string())])],
            values: vec![VCardValue::Binary(Data {
                content_type: Some(mime.to_string()),
                data: data.to_vec(),
            })],
        });
    }
    VCard { entries }
}

/// Serialises a card as vCard 3.0; binary values get `ENCODING=b`.
fn write_card(card: &VCard) -> AppResult<String> {
    let mut out = String::new();
    card.write_to(&mut out, VCardVersion::V3_0).map_err(|e| {
        AppError::with_source(ErrorKind::Serialization, "Cannot serialise vCard", e)
    })?;
    Ok(out)
}

fn parse_card(data: &[u8]) -> AppResult<VCard> {
    let text = std::str::from_utf8(data).map_err(|e| {
        AppError::with_source(ErrorKind::Serialization, "Stored vCard is not UTF-8", e)
    })?;
    VCard::parse(text)
        .map_err(|_| AppError::new(ErrorKind::Serialization, "Stored vCard cannot be parsed"))
}

fn formatted_name(card: &VCard) -> Option<&str> {
    card.property(&VCardProperty::Fn)
        .and_then(|entry| entry.values.first())
        .and_then(VCardValue::as_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_database::DatabasePool;
    use cumulus_database::repositories::addressbook::card_etag;
    use cumulus_entity::user::CreateUser;

    async fn setup() -> (AddressBookSync, Arc<UserRepository>, Arc<CardDavRepository>) {
        let db = DatabasePool::in_memory().await.expect("database");
        let users = Arc::new(UserRepository::new(db.pool().clone()));
        let cards = Arc::new(CardDavRepository::new(db.into_pool()));
        (AddressBookSync::new(users.clone(), cards.clone()), users, cards)
    }

    #[tokio::test]
    async fn test_sync_creates_then_updates_cards() {
        let (sync, users, cards) = setup().await;
        for i in 0..60 {
            users
                .create(&CreateUser {
                    uid: format!("user{i:02}"),
                    display_name: format!("User {i}"),
                    ..CreateUser::default()
                })
                .await
                .unwrap();
        }
        users
            .create(&CreateUser {
                uid: "zoe".into(),
                display_name: "Zoe".into(),
                backend: "LDAP".into(),
                avatar: Some(("image/jpeg".into(), vec![0xff, 0xd8, 0xff])),
                ..CreateUser::default()
            })
            .await
            .unwrap();

        let mut seen = 0;
        let report = sync.sync_system_address_book(|_| seen += 1).await.unwrap();
        assert_eq!(report, SyncReport { created: 61, updated: 0, unchanged: 0 });
        assert_eq!(seen, 61);

        let book = sync.ensure_system_address_book().await.unwrap();
        assert_eq!(book.description.as_deref(), Some(SYSTEM_DESCRIPTION));
        let zoe = cards.find_card(book.id, "LDAP:zoe.vcf").await.unwrap().expect("card");
        let text = String::from_utf8(zoe.card_data.clone()).unwrap();
        assert!(text.contains("UID:zoe\r\n"));
        assert!(text.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"), "{text}");
        assert!(text.contains("FN:Zoe\r\n"));
        assert!(text.contains("PHOTO;TYPE=image/jpeg;ENCODING=b:/9j/\r\n"), "{text}");
        assert_eq!(zoe.etag, card_etag(&zoe.card_data));
        assert_eq!(sync.get_card_uri(zoe.id).await.unwrap(), "LDAP:zoe.vcf");

        users.update_display_name("zoe", "Zoe Q").await.unwrap();
        let report = sync.sync_system_address_book(|_| {}).await.unwrap();
        assert_eq!(report, SyncReport { created: 0, updated: 1, unchanged: 60 });

        let zoe_after = cards.find_card(book.id, "LDAP:zoe.vcf").await.unwrap().unwrap();
        assert_ne!(zoe_after.etag, zoe.etag);
        let card = parse_card(&zoe_after.card_data).unwrap();
        assert_eq!(card.uid(), Some("zoe"));
        assert_eq!(formatted_name(&card), Some("Zoe Q"));
        assert!(card.property(&VCardProperty::Photo).is_some());

        let refreshed = sync.ensure_system_address_book().await.unwrap();
        assert_eq!(refreshed.id, book.id);
        assert!(refreshed.sync_token > book.sync_token);
        assert!(sync.get_card_uri(9999).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_parse_card_from_other_clients() {
        let card = parse_card(b"BEGIN:VCARD\r\nVERSION:4.0\r\nUID:x\r\nFN:Old Name\r\nEND:VCARD\r\n")
            .unwrap();
        assert_eq!(card.uid(), Some("x"));
        assert_eq!(formatted_name(&card), Some("Old Name"));

        let err = parse_card(b"not a card").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(parse_card(&[0xff, 0xfe]).is_err());
    }
}
