//! # imghash CLI
//!
//! Command-line interface for the image hashing library.
//!
//! ## Usage
//! ```bash
//! imghash hash -a phash photo.jpg
//! imghash compare -a pdq a.jpg b.jpg --output json
//! ```

mod cli;

use image_hashes::Result;

fn main() -> Result<()> {
    image_hashes::init_tracing();
    cli::run()
}
