//! JWT signing and verification.
//!
//! Server-side `Token` values are converted into signed JWTs here. Two
//! signing modes are supported, selected per client:
//!
//! - **HS256**: symmetric, keyed with the client's plaintext secret
//! - **RS256**: asymmetric, keyed with the provider's RSA signing key
//!
//! Signing material is resolved through the [`SigningKeyProvider`] seam so
//! deployments can back it with an HSM, a key-rotation scheme, or a static
//! key pair.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::{Client, SigningKeyType, Token};

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGenerationError {
        /// Description of the key generation error.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates a new `KeyGenerationError`.
    #[must_use]
    pub fn key_generation_error(message: impl Into<String>) -> Self {
        Self::KeyGenerationError {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidKey { .. } | JwtError::KeyGenerationError { .. } => {
                AuthError::configuration(err.to_string())
            }
            other => AuthError::internal(other.to_string()),
        }
    }
}

/// The wire shape of a signed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Issuer.
    pub iss: String,

    /// Subject.
    pub sub: String,

    /// Audience: the client id for identity tokens, the resource
    /// audience for access tokens.
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// OAuth client the token was issued to.
    pub client_id: String,

    /// Space-separated granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Nonce from the authorization request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Claims contributed by the claims provider.
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl From<&Token> for JwtClaims {
    fn from(token: &Token) -> Self {
        let scope = if token.claims.scopes.is_empty() {
            None
        } else {
            Some(token.scope_string())
        };

        Self {
            iss: token.issuer.clone(),
            sub: token.claims.subject.clone(),
            aud: token.audience.clone(),
            exp: token.expiry_unix(),
            iat: token.claims.issued_at.unix_timestamp(),
            client_id: token.client_id.clone(),
            scope,
            nonce: token.claims.nonce.clone(),
            custom: token.claims.custom.clone(),
        }
    }
}

/// Key material for signing one client's tokens.
#[derive(Clone, Debug)]
pub enum SigningMaterial {
    /// Symmetric HS256 keyed with the client's plaintext secret.
    ClientSecret {
        /// The shared secret.
        secret: String,
    },

    /// Asymmetric RS256 keyed with an RSA key pair.
    RsaKeyPair {
        /// Key ID advertised in the JWT header.
        kid: Option<String>,
        /// PEM-encoded PKCS#8 private key.
        private_pem: String,
        /// PEM-encoded SPKI public key.
        public_pem: String,
    },
}

impl SigningMaterial {
    /// Generates a fresh 2048-bit RSA key pair.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation or PEM export fails.
    pub fn generate_rsa(kid: Option<String>) -> Result<Self, JwtError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;

        Ok(Self::RsaKeyPair {
            kid,
            private_pem: private_pem.to_string(),
            public_pem,
        })
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            Self::ClientSecret { .. } => Algorithm::HS256,
            Self::RsaKeyPair { .. } => Algorithm::RS256,
        }
    }

    fn encoding_key(&self) -> Result<EncodingKey, JwtError> {
        match self {
            Self::ClientSecret { secret } => Ok(EncodingKey::from_secret(secret.as_bytes())),
            Self::RsaKeyPair { private_pem, .. } => {
                EncodingKey::from_rsa_pem(private_pem.as_bytes())
                    .map_err(|e| JwtError::invalid_key(e.to_string()))
            }
        }
    }

    fn decoding_key(&self) -> Result<DecodingKey, JwtError> {
        match self {
            Self::ClientSecret { secret } => Ok(DecodingKey::from_secret(secret.as_bytes())),
            Self::RsaKeyPair { public_pem, .. } => DecodingKey::from_rsa_pem(public_pem.as_bytes())
                .map_err(|e| JwtError::invalid_key(e.to_string())),
        }
    }

    fn kid(&self) -> Option<String> {
        match self {
            Self::ClientSecret { .. } => None,
            Self::RsaKeyPair { kid, .. } => kid.clone(),
        }
    }
}

/// Resolves signing material for a client.
#[async_trait::async_trait]
pub trait SigningKeyProvider: Send + Sync {
    /// Returns the material used to sign tokens for this client, honoring
    /// the client's configured signing key type.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` when no usable material exists
    /// for the client.
    async fn material_for(&self, client: &Client) -> AuthResult<SigningMaterial>;
}

/// Key provider backed by a single RSA key pair.
///
/// Clients configured for certificate signing get the key pair; clients
/// configured for secret signing are rejected because the provider only
/// holds hashed secrets and cannot recover the plaintext.
pub struct StaticKeyProvider {
    material: SigningMaterial,
}

impl StaticKeyProvider {
    /// Creates a provider around existing material.
    #[must_use]
    pub fn new(material: SigningMaterial) -> Self {
        Self { material }
    }

    /// Creates a provider with a freshly generated RSA key pair.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate(kid: Option<String>) -> Result<Self, JwtError> {
        Ok(Self {
            material: SigningMaterial::generate_rsa(kid)?,
        })
    }
}

#[async_trait::async_trait]
impl SigningKeyProvider for StaticKeyProvider {
    async fn material_for(&self, client: &Client) -> AuthResult<SigningMaterial> {
        match client.signing_key_type {
            SigningKeyType::Certificate => Ok(self.material.clone()),
            SigningKeyType::ClientSecret => Err(AuthError::configuration(format!(
                "client {} requires secret signing but no plaintext secret is available",
                client.client_id
            ))),
        }
    }
}

/// Stateless JWT encoder/decoder.
#[derive(Debug, Default)]
pub struct JwtService;

impl JwtService {
    /// Creates a new JWT service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Signs a server-side token into its JWT wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing material is unusable or encoding
    /// fails.
    pub fn sign(&self, token: &Token, material: &SigningMaterial) -> Result<String, JwtError> {
        let mut header = Header::new(material.algorithm());
        header.kid = material.kid();

        let claims = JwtClaims::from(token);
        encode(&header, &claims, &material.encoding_key()?)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and validates a JWT against the given material.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid, the token is expired,
    /// or the payload does not parse.
    pub fn decode(
        &self,
        jwt: &str,
        material: &SigningMaterial,
    ) -> Result<TokenData<JwtClaims>, JwtError> {
        let mut validation = Validation::new(material.algorithm());
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode(jwt, &material.decoding_key()?, &validation).map_err(JwtError::from)
    }
}

/// Decodes a JWT payload without verifying the signature. Test helper and
/// introspection aid; never use for trust decisions.
///
/// # Errors
///
/// Returns an error if the token is not structurally a JWT.
pub fn decode_payload_unverified(jwt: &str) -> Result<Map<String, Value>, JwtError> {
    let mut parts = jwt.split('.');
    let payload = parts
        .nth(1)
        .ok_or_else(|| JwtError::decoding_error("not a JWT"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| JwtError::decoding_error(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| JwtError::decoding_error(e.to_string()))
}
