//! Token creation and JWT signing.

pub mod jwt;
pub mod service;

pub use jwt::{
    JwtClaims, JwtError, JwtService, SigningKeyProvider, SigningMaterial, StaticKeyProvider,
};
pub use service::{TokenCreationRequest, TokenService};
