//! # Yatube Core
//!
//! The domain layer of the Yatube blog.
//! This crate contains entities, ports and pagination with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;

pub use error::RepoError;
pub use pagination::{POSTS_PER_PAGE, Page, PageWindow, Paginator};
