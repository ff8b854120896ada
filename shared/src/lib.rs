use bevy_log::debug;
use bincode::Options;

pub mod constants;
pub mod errors;
pub mod hull;
pub mod physics;
pub mod utils;
pub mod water;

pub use constants::*;
pub use errors::ConfigError;
use utils::format_bytes;

/// Serialize `value` with bincode and lz4-compress the result.
pub fn encode_payload<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, bincode::Error> {
    let payload = bincode::options().serialize(value)?;
    let output = lz4::block::compress(&payload, None, true)?;
    if output.len() > 1024 {
        debug!(
            "Payload encoded: {} -> {}",
            format_bytes(payload.len() as u64),
            format_bytes(output.len() as u64)
        );
    }
    Ok(output)
}

pub fn decode_payload<T: serde::de::DeserializeOwned>(payload: &[u8]) -> Result<T, bincode::Error> {
    let decompressed_payload = lz4::block::decompress(payload, None)?;
    bincode::options().deserialize(&decompressed_payload)
}
