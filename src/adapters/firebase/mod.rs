//! Firebase adapters: Firestore record store and Identity Toolkit accounts.
//!
//! Both APIs are reached over REST with a bearer token minted from the
//! service-account credential; the shared [`TokenProvider`] handles that
//! exchange and caches the token.

mod auth;
mod firestore;
mod token;

pub use auth::FirebaseAuthClient;
pub use firestore::FirestoreRecordStore;
pub use token::{ServiceAccountKey, TokenError, TokenProvider};
