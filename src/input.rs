use std::io::{self, BufRead};

/// Read one address per line, trimming whitespace and skipping blank lines.
pub fn read_addresses<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut addresses = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let email = line.trim();
        if !email.is_empty() {
            addresses.push(email.to_string());
        }
    }
    Ok(addresses)
}
