//! Form view model and controller for the suppliers client.
//!
//! The original supplier service shipped with a form page whose entire
//! behavior was a handful of button handlers mutating page-global state.
//! This crate reimplements that contract as explicit, injectable objects:
//!
//! - [`FormFields`]: the entry form, one string per visible field
//! - [`FlashMessage`]: the single status line, overwritten on every action
//! - [`ResultsTable`]: the search results area, replaced on every search
//! - [`FormController`]: translates actions into API calls and outcomes
//!   back into view state
//!
//! The controller is generic over [`suppliers_api::SupplierApi`], so every
//! state transition is unit-testable without a server.

mod controller;
mod fields;
mod flash;
mod table;

pub use controller::{DELETED_FLASH, FormController, FormError, SUCCESS_FLASH};
pub use fields::FormFields;
pub use flash::FlashMessage;
pub use table::{EMPTY_TABLE_PLACEHOLDER, ResultsTable};
