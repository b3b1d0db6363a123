// web-server/src/utils/token.rs
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a random lowercase alphanumeric suffix of specified length
pub fn random_suffix(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Generate a synthetic plant identifier with a timestamp and random
/// component. The backend has no first-class plant entity; entries sharing
/// this identifier form one plant. Uniqueness is practical collision
/// improbability, not a cryptographic guarantee.
pub fn generate_plant_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    format!("plant-{}-{}", timestamp, random_suffix(9))
}
