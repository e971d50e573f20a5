//! External-router plugin for the export flow.
//!
//! Drives a standalone routing executable through a generated run script:
//! the design is written to a scratch checkpoint, the router is invoked on
//! it and routes it in place, and its summary report is parsed to decide
//! whether routing succeeded.

use lazy_static::lazy_static;
use tera::Tera;

pub mod error;
pub mod route;
pub mod utils;

pub use route::{ExternalRouter, RouteReport};

pub const TEMPLATES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        match Tera::new(&format!("{TEMPLATES_PATH}/*")) {
            Ok(t) => t,
            Err(e) => {
                panic!("Encountered errors while parsing Tera templates: {e}");
            }
        }
    };
}
