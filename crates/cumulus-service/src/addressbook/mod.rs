//! System address book: one vCard per user of the instance.

pub mod sync;

pub use sync::{AddressBookSync, SyncReport, card_for_user, card_uri_for};
