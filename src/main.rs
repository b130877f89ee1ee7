//! # dupe-match CLI
//!
//! Command-line interface for the duplicate file matcher.
//!
//! ## Usage
//! ```bash
//! dupe-match ~/work ~/originals --rename
//! dupe-match ~/work ~/originals --media-magic --output json
//! ```

mod cli;

use duplicate_file_matcher::Result;

fn main() -> Result<()> {
    cli::run()
}
