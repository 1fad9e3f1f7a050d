//! Generic data grid engine
//!
//! Turns a list of key/value records plus an optional column list into a
//! filtered, sorted and paged view. Nothing in here knows about users, posts
//! or any other entity kind: domain presentation is supplied by the host
//! through column renderers.

pub mod column;
pub mod controller;
pub mod dispatch;
pub mod filter;
pub mod paginate;
pub mod record;
pub mod sort;

pub use column::{Column, Renderer};
pub use controller::{GridConfig, GridController, GridSnapshot, ViewState};
pub use dispatch::{infer_columns, render_cell, render_row, resolve_columns};
pub use filter::filter;
pub use paginate::{paginate, Page};
pub use record::{Record, Value};
pub use sort::{sort, SortDirection};
