//! Utils

use clap::Parser;

/// Arguments for the storefront demos
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Number of products to add to the cart
    #[clap(short, long)]
    pub n: Option<usize>,

    /// Fixture set to use
    #[clap(short, long, default_value = "market")]
    pub fixture: String,

    /// Check out for delivery instead of pickup
    #[clap(short, long)]
    pub delivery: bool,
}
