//! # Yatube Shared
//!
//! Request DTOs shared by the web layer: query strings, submitted forms
//! and their validation.

pub mod dto;
pub mod form;

pub use form::FormErrors;
