//! The library code for the `genablog` static blog generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Reading the blog's input tree into memory ([`crate::blog`])
//! 2. Writing the output site to a fresh run directory ([`crate::write`])
//!
//! The read step builds the in-memory model: one [`crate::page::BlogPage`]
//! per entry directory (sorted by date), one [`crate::page::WebPage`] per
//! static page, and the [`crate::tag::Tag`] index which maps each tag label to
//! the entries that mention it.
//!
//! The write step is the more involved of the two. Every output page is the
//! user's header fragment, a navigation bar, a generated body and the user's
//! footer fragment, and pages at different depths of the output tree need
//! their relative links adjusted accordingly. It is composed of these
//! sub-steps:
//!
//! 1. Creating the timestamped run directory
//! 2. Writing the root pages (index, tag index, static pages)
//! 3. Writing the yearly archive pages
//! 4. Writing the entry pages
//! 5. Writing the per-tag pages
//! 6. Copying the global and per-entry assets

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod assets;
pub mod blog;
pub mod build;
pub mod config;
pub mod page;
pub mod tag;
pub mod util;
pub mod write;
