//! Static files compiled into the binary.

use rust_embed::RustEmbed;

/// Contents of `static/`: the console stylesheet.
#[derive(RustEmbed)]
#[folder = "static/"]
pub struct Assets;
