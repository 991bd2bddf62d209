//! The library code for the `bitacora` blog builder. A build runs in two
//! steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::parser`])
//! 2. Writing the results back out ([`crate::write`] and [`crate::index`])
//!
//! The first step is the more involved. Each document passes through a fixed
//! pipeline ([`crate::post::Pipeline`]): the metadata header is split off
//! ([`crate::frontmatter`]), drafts are set aside, boilerplate sections are
//! optionally appended ([`crate::augment`]) and finally every [`post::Post`]
//! field is derived ([`crate::fields`]), using the slugifier
//! ([`crate::slug`]) and the plain-text projector ([`crate::plain`]) along
//! the way.
//!
//! The second step renders each post body with a small line-based Markdown
//! renderer ([`crate::markdown`]), applies the post template and writes the
//! page, then regenerates the marked regions of the blog index page.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod augment;
pub mod build;
pub mod config;
pub mod fields;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod parser;
pub mod plain;
pub mod post;
pub mod scaffold;
pub mod slug;
pub mod write;
