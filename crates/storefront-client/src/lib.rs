//! Catalog sync controller and balance inquiry client for the storefront admin
//!
//! The [`CatalogController`] keeps a fully paginated snapshot of the remote
//! product catalog and routes every write through a refresh-after-write
//! cycle: a successful create, update or delete is followed by a full
//! re-fetch, never by a local patch. [`BalanceBoard`] does the read-only
//! equivalent for the payment provider's balance inquiry.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod balance;
pub mod catalog;
pub mod error;
pub mod notice;

pub use balance::{
    BalanceBoard, BalanceSource, BalanceTable, BalanceView, HttpBalanceClient, StaticBalance,
};
pub use catalog::{
    CatalogApi, CatalogController, CatalogSnapshot, ConfirmedDeletion, EditorState,
    HttpCatalogApi, InMemoryCatalog, Mutation, PendingDeletion, ProductForm, RefreshOutcome,
    fetch_all_pages, into_snapshot,
};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use notice::{Notice, NoticeLevel, Operation};
