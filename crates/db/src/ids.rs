// crates/db/src/ids.rs
// Process-wide monotonic ULID source.
//
// A shared generator makes ids minted within the same millisecond
// strictly increasing, so `ORDER BY started_at, id` reproduces
// creation order even when rows share a unix second.

use std::sync::{Mutex, OnceLock};

use ulid::{Generator, Ulid};

static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();

pub(crate) fn new_id() -> String {
    let generator = GENERATOR.get_or_init(|| Mutex::new(Generator::new()));
    let mut generator = generator.lock().unwrap();
    // The random component can overflow within one millisecond; a
    // fresh random ulid is better than failing the write.
    match generator.generate() {
        Ok(id) => id.to_string(),
        Err(_) => Ulid::new().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_mint_in_strictly_increasing_order() {
        let ids: Vec<String> = (0..500).map(|_| new_id()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }
}
