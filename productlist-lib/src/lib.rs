//! Product list controller library
//!
//! The core of a paginated, sortable list whose multi-selection is kept in
//! step with an external, asynchronous selection authority.
//!
//! - [`store`] holds the current snapshot of rows
//! - [`sort`] orders rows by one column, always from ingestion order
//! - [`page`] windows the ordered rows and clamps the page index
//! - [`selection`] owns the identity-keyed selection and replays it to the
//!   authority after every change
//! - [`view`] assembles the render-ready projection
//! - [`controller`] ties them together behind one owner

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod observe;
pub mod page;
pub mod selection;
pub mod sort;
pub mod source;
pub mod store;
pub mod view;

pub use controller::ListController;
pub use view::ViewState;
