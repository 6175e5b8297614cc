//! Owner keypair loading.

use crate::config::KeypairSource;
use damm_cycler_domain::CyclerError;
use solana_sdk::signature::Keypair;
use std::fs;

/// Loads the owner keypair from its configured source.
pub fn load_keypair(source: &KeypairSource) -> Result<Keypair, CyclerError> {
    match source {
        KeypairSource::File(path) => {
            let raw = fs::read_to_string(path).map_err(|e| {
                CyclerError::Configuration(format!("cannot read keypair file {path}: {e}"))
            })?;
            let bytes: Vec<u8> = serde_json::from_str(&raw).map_err(|e| {
                CyclerError::Configuration(format!("keypair file {path} is malformed: {e}"))
            })?;
            Keypair::try_from(bytes.as_slice())
                .map_err(|e| CyclerError::Configuration(format!("invalid keypair bytes: {e}")))
        }
        KeypairSource::Base58(secret) => {
            let bytes = bs58::decode(secret)
                .into_vec()
                .map_err(|e| CyclerError::Configuration(format!("invalid base58 secret: {e}")))?;
            Keypair::try_from(bytes.as_slice())
                .map_err(|e| CyclerError::Configuration(format!("invalid keypair bytes: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signer::Signer;

    #[test]
    fn test_base58_roundtrip() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();

        let loaded = load_keypair(&KeypairSource::Base58(encoded)).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_invalid_base58_is_configuration_error() {
        let err = load_keypair(&KeypairSource::Base58("not base58 %%%".to_string())).unwrap_err();
        assert!(matches!(err, CyclerError::Configuration(_)));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err =
            load_keypair(&KeypairSource::File("/definitely/missing.json".to_string())).unwrap_err();
        assert!(matches!(err, CyclerError::Configuration(_)));
    }
}
