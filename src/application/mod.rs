//! Application services: loading, indexing and publishing the site.

pub mod chrome;
pub mod content;
pub mod error;
pub mod index;
pub mod notify;
pub mod og;
pub mod pages;
pub mod render;
pub mod repos;
pub mod search;
pub mod seo;
pub mod site;
pub mod sitemap;
pub mod stats;
pub mod syndication;
pub mod text;
