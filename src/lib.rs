//! Paginated, searchable, sortable record grid plus a terminal console for
//! managing users and posts on top of it.

pub mod app;
pub mod columns;
pub mod config;
pub mod domain;
pub mod fileio;
pub mod grid;
pub mod service;
pub mod stats;
pub mod style;
pub mod ui;
