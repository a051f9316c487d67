//! Fuzz target for `multinom.toml` parsing.
//!
//! Parsing and semantic validation must reject bad input with an error,
//! never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mn_common::Config;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = Config::from_toml_str(text) {
            // Anything that validates must be usable as distribution options.
            assert!(config.distribution.validate().is_ok());
        }
    }
});
