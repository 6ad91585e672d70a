//! The signing pipeline: one strictly linear attempt from access-key query
//! to transport-ready base64.
//!
//! ```text
//! Idle → StateFetched → Built → Serialized → Signed → Encoded → Done
//! ```
//!
//! No backward transitions, no retries, no partial output. A failure at any
//! stage aborts the whole attempt with a [`PipelineError`] tagged by
//! [`Stage`]; the caller retries the *entire* pipeline, which re-fetches
//! state and therefore picks up a fresh nonce.
//!
//! Only the access-key query can block or suspend. Everything after it is
//! pure, synchronous, CPU-bound computation. If two attempts for the same
//! (account, key) pair run concurrently they will observe the same access
//! key and produce the same conflicting nonce — serializing attempts per key
//! is the caller's job, not this crate's.

use tracing::{debug, info};

use crate::client::{AccessKeyProvider, JsonRpcClient, RpcError};
use crate::config::SignerConfig;
use crate::crypto::{KeyError, LumenKeypair};
use crate::transaction::envelope::SignedTransaction;
use crate::transaction::signing::{sign_transaction, SignError};
use crate::transaction::{Action, Balance, BuildError, SchemaError, TransactionBuilder};

/// Where in the pipeline a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Parsing the secret key from configuration.
    Credentials,
    /// Querying the access key for nonce and block hash.
    FetchState,
    /// Assembling and validating the unsigned transaction.
    Build,
    /// Canonical serialization, digesting, and signing.
    Sign,
    /// Envelope and transport encoding.
    Encode,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Credentials => "credentials",
            Self::FetchState => "fetch-state",
            Self::Build => "build",
            Self::Sign => "sign",
            Self::Encode => "encode",
        };
        write!(f, "{}", name)
    }
}

/// A stage-tagged pipeline failure.
///
/// One variant per fallible stage; [`stage`](Self::stage) recovers the tag
/// for callers that route on it. A missing access key surfaces here as
/// `FetchState(RpcError::UnknownAccessKey)` — never as a default nonce.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("credentials: {0}")]
    Credentials(#[from] KeyError),

    #[error("fetch-state: {0}")]
    FetchState(#[from] RpcError),

    #[error("build: {0}")]
    Build(#[from] BuildError),

    #[error("sign: {0}")]
    Sign(#[from] SignError),

    #[error("encode: {0}")]
    Encode(SchemaError),
}

impl PipelineError {
    /// The stage at which the attempt was aborted.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Credentials(_) => Stage::Credentials,
            Self::FetchState(_) => Stage::FetchState,
            Self::Build(_) => Stage::Build,
            Self::Sign(_) => Stage::Sign,
            Self::Encode(_) => Stage::Encode,
        }
    }
}

/// Everything a successful attempt produces.
///
/// `transport` is the only thing the network needs; the envelope and hash
/// are kept so callers can log, inspect, or correlate the submission with
/// the ledger's execution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// The signed envelope, pre-encoding.
    pub signed_transaction: SignedTransaction,
    /// SHA-256 of the canonical transaction bytes — the ID the ledger will
    /// report this transaction under.
    pub transaction_hash: [u8; 32],
    /// Standard base64 of the envelope bytes: the single parameter of a
    /// `broadcast_tx_commit` call.
    pub transport: String,
}

/// Runs one signing attempt for an arbitrary action list.
///
/// Fetches the access key, uses exactly `nonce + 1`, builds, signs, and
/// encodes. The `actions` order is preserved on the wire.
pub async fn sign_actions<P: AccessKeyProvider + ?Sized>(
    provider: &P,
    keypair: &LumenKeypair,
    sender_id: &str,
    receiver_id: &str,
    actions: Vec<Action>,
) -> Result<SignedPayload, PipelineError> {
    let public_key = keypair.public_key();

    let state = provider.view_access_key(sender_id, &public_key).await?;
    debug!(sender_id, nonce = state.nonce, "access key state fetched");

    // The ledger reports the last *consumed* nonce; ours must be exactly
    // one past it.
    let nonce = state
        .nonce
        .checked_add(1)
        .ok_or(PipelineError::Build(BuildError::NonceOverflow))?;

    let transaction = TransactionBuilder::new(sender_id, public_key, receiver_id)
        .nonce(nonce)
        .actions(actions)
        .block_hash(state.block_hash)
        .build()?;
    debug!(nonce, actions = transaction.actions.len(), "transaction built");

    let (signature, transaction_hash) = sign_transaction(&transaction, keypair)?;

    let signed_transaction = SignedTransaction::new(transaction, signature);
    let transport = signed_transaction
        .to_transport_string()
        .map_err(PipelineError::Encode)?;

    info!(
        sender_id,
        receiver_id,
        nonce,
        tx_hash = %hex::encode(transaction_hash),
        "transaction signed and encoded"
    );
    Ok(SignedPayload {
        signed_transaction,
        transaction_hash,
        transport,
    })
}

/// One signing attempt for a plain transfer of `deposit` smallest-units.
pub async fn transfer<P: AccessKeyProvider + ?Sized>(
    provider: &P,
    keypair: &LumenKeypair,
    sender_id: &str,
    receiver_id: &str,
    deposit: Balance,
) -> Result<SignedPayload, PipelineError> {
    sign_actions(
        provider,
        keypair,
        sender_id,
        receiver_id,
        vec![Action::transfer(deposit)],
    )
    .await
}

/// Runs the pipeline from explicit configuration: parses the secret key,
/// builds a [`JsonRpcClient`] for the configured endpoint, and signs the
/// given actions from `sender_id` to `receiver_id`.
///
/// Broadcasting is left to the caller — typically
/// `JsonRpcClient::new(&config.endpoint).broadcast_tx_commit(&payload.transport)`.
pub async fn sign_with_config(
    config: &SignerConfig,
    actions: Vec<Action>,
) -> Result<SignedPayload, PipelineError> {
    let keypair = LumenKeypair::from_secret_str(&config.secret_key)?;
    let client = JsonRpcClient::new(&config.endpoint);
    sign_actions(
        &client,
        &keypair,
        &config.sender_id,
        &config.receiver_id,
        actions,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AccessKeyState;
    use crate::crypto::LumenPublicKey;
    use async_trait::async_trait;

    /// In-memory provider serving a fixed access-key state.
    struct FixedProvider {
        nonce: u64,
        block_hash: [u8; 32],
    }

    #[async_trait]
    impl AccessKeyProvider for FixedProvider {
        async fn view_access_key(
            &self,
            _account_id: &str,
            _public_key: &LumenPublicKey,
        ) -> Result<AccessKeyState, RpcError> {
            Ok(AccessKeyState {
                nonce: self.nonce,
                block_hash: self.block_hash,
            })
        }
    }

    /// Provider for an account/key the ledger has never seen.
    struct MissingKeyProvider;

    #[async_trait]
    impl AccessKeyProvider for MissingKeyProvider {
        async fn view_access_key(
            &self,
            account_id: &str,
            public_key: &LumenPublicKey,
        ) -> Result<AccessKeyState, RpcError> {
            Err(RpcError::UnknownAccessKey {
                account_id: account_id.to_string(),
                public_key: public_key.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn nonce_is_exactly_state_plus_one() {
        let provider = FixedProvider {
            nonce: 41,
            block_hash: [3u8; 32],
        };
        let kp = LumenKeypair::from_seed(&[1u8; 32]);
        let payload = transfer(&provider, &kp, "a.testnet", "b.testnet", 100)
            .await
            .unwrap();

        assert_eq!(payload.signed_transaction.transaction.nonce, 42);
        assert_eq!(payload.signed_transaction.transaction.block_hash, [3u8; 32]);
    }

    #[tokio::test]
    async fn sequential_builds_without_submission_collide_on_nonce() {
        // Both attempts observe nonce 41 and request 42. Serializing
        // attempts per key is the caller's responsibility, and this is why.
        let provider = FixedProvider {
            nonce: 41,
            block_hash: [0u8; 32],
        };
        let kp = LumenKeypair::from_seed(&[1u8; 32]);

        let first = transfer(&provider, &kp, "a.testnet", "b.testnet", 1)
            .await
            .unwrap();
        let second = transfer(&provider, &kp, "a.testnet", "b.testnet", 1)
            .await
            .unwrap();

        assert_eq!(
            first.signed_transaction.transaction.nonce,
            second.signed_transaction.transaction.nonce
        );
    }

    #[tokio::test]
    async fn pipeline_is_deterministic_for_fixed_state() {
        let provider = FixedProvider {
            nonce: 4,
            block_hash: [9u8; 32],
        };
        let kp = LumenKeypair::from_seed(&[2u8; 32]);

        let a = transfer(&provider, &kp, "a.testnet", "b.testnet", 7)
            .await
            .unwrap();
        let b = transfer(&provider, &kp, "a.testnet", "b.testnet", 7)
            .await
            .unwrap();
        assert_eq!(a.transport, b.transport);
        assert_eq!(a.transaction_hash, b.transaction_hash);
    }

    #[tokio::test]
    async fn missing_access_key_aborts_at_fetch_state() {
        let kp = LumenKeypair::from_seed(&[1u8; 32]);
        let err = transfer(&MissingKeyProvider, &kp, "ghost.testnet", "b.testnet", 1)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::FetchState);
        assert!(matches!(
            err,
            PipelineError::FetchState(RpcError::UnknownAccessKey { .. })
        ));
    }

    #[tokio::test]
    async fn empty_action_list_aborts_at_build() {
        let provider = FixedProvider {
            nonce: 1,
            block_hash: [0u8; 32],
        };
        let kp = LumenKeypair::from_seed(&[1u8; 32]);
        let err = sign_actions(&provider, &kp, "a.testnet", "b.testnet", vec![])
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Build);
        assert!(matches!(
            err,
            PipelineError::Build(BuildError::EmptyActionList)
        ));
    }

    #[tokio::test]
    async fn exhausted_nonce_aborts_at_build() {
        let provider = FixedProvider {
            nonce: u64::MAX,
            block_hash: [0u8; 32],
        };
        let kp = LumenKeypair::from_seed(&[1u8; 32]);
        let err = transfer(&provider, &kp, "a.testnet", "b.testnet", 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Build(BuildError::NonceOverflow)
        ));
    }

    #[tokio::test]
    async fn bad_secret_aborts_at_credentials_before_any_query() {
        let config = SignerConfig::new(
            "ed25519:",
            "a.testnet",
            "b.testnet",
            // Unroutable on purpose: the pipeline must fail before dialing.
            "http://127.0.0.1:0",
        );
        let err = sign_with_config(&config, vec![Action::transfer(1)])
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Credentials);
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(Stage::FetchState.to_string(), "fetch-state");
        assert_eq!(Stage::Encode.to_string(), "encode");
    }
}
