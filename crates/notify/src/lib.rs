//! Digest delivery.
//!
//! Address book loading, mail transports (AWS SES and a console transport
//! for dry runs) and the per-assignee notifier.

#![warn(missing_docs)]

pub mod address_book;
pub mod transport;
pub mod sigv4;
pub mod ses;
pub mod notifier;

pub use address_book::{AddressBook, AddressBookError, SENDER_KEY};
pub use transport::{ConsoleTransport, MailTransport, OutgoingEmail, SendError};
pub use ses::{SesConfig, SesTransport};
pub use sigv4::Credentials;
pub use notifier::{DeliveryReport, Notifier, DEFAULT_SUBJECT};
