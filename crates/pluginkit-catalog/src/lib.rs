//! # pluginkit-catalog
//!
//! Catalog backends for pluginkit:
//! - [`GitHubCatalog`]: plugins published as GitHub repository releases
//! - [`LocalCatalog`]: plugins laid out in a directory tree
//!
//! Both share the asset naming rules in [`assets`].

pub mod assets;
pub mod github;
pub mod local;

pub use assets::{filter_assets, find_asset, install_file_name, listing_runtime, ResolvedAsset};
pub use github::GitHubCatalog;
pub use local::LocalCatalog;
