//! Core library for bookverse
//!
//! This crate implements the **Functional Core** of the bookverse application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! - **`bookverse_core`** (this crate): Pure transformation functions with zero I/O
//! - **`bookverse`**: I/O operations and orchestration (the Imperative Shell)
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`session`]: The search/pagination/filter state machine that decides what
//!   catalog query is issued and when
//! - [`books`]: Catalog record models and the record-to-view projections
//!
//! # Example: testing a projection
//!
//! ```
//! use bookverse_core::books::{transform_volume_list, VolumeList};
//! use bookverse_core::session::Category;
//!
//! let list = VolumeList { total_items: Some(0), items: None };
//! let output = transform_volume_list(list, "dune", Category::Science, 0);
//!
//! assert!(output.items.is_empty());
//! assert_eq!(output.pagination.current_page, 1);
//! ```
//!
//! The key insight: data transformation logic should be pure and ignorant of
//! where data comes from or where it goes.

pub mod books;
pub mod session;
