//! Round command implementation.

use docparity_canonical::{normalize_in_place, to_canonical_string, DocValue};
use std::io::{self, Read};

pub fn run(input: Option<String>, precision: u32) -> Result<(), Box<dyn std::error::Error>> {
    // Read JSON from file or stdin
    let json_str = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let mut value = DocValue::from_json_str(&json_str)?;
    normalize_in_place(&mut value, precision);
    println!("{}", to_canonical_string(&value)?);
    Ok(())
}
