//! Core types and trait definitions for Quizz.
//!
//! This crate has no HTTP or database dependencies.
//! Storage backends implement [`store::QuizStore`], grading backends implement
//! [`grade::Grader`]; everything else builds on those two seams.

// Trait impls use native `async fn`; the `Send` bounds live on the trait
// signatures.
#![allow(async_fn_in_trait)]

pub mod attempt;
pub mod error;
pub mod grade;
pub mod id;
pub mod quiz;
pub mod reconcile;
pub mod store;
pub mod submission;

pub use error::{Classify, Error, ErrorKind, Result};
