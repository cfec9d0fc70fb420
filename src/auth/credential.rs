//! Client-side credential encoding for the vendor login
//!
//! The vendor never receives the plaintext password. The login endpoint
//! expects the password encrypted with RSA PKCS#1 v1.5 under a fixed,
//! vendor-published public key, and then base64-encoded. PKCS#1 v1.5
//! encryption is randomized, so two encodings of the same secret differ;
//! the vendor does not require replay-equality.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

use crate::error::{Result, ShinebridgeError};

/// The vendor's published RSA public key, base64-encoded SPKI DER.
const VENDOR_PUBLIC_KEY_B64: &str = "MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAnAJE68pjWZmtSg6ZJs9FZugJXC6bBSluTW6mJttOLOaljrdErVnM5DNN+YFzpB9pAysTErjY1bnSVuEwQSwptnqUji7Ch2qMj2n+0eCp8p6vtSh7/tFr2ul8nDRtkoswLANAIwtUk/G85ipMpmY1W642LImnEJmGkkddlbjbjxJTZWR5hc/d9cPWb+AR77LxFFrMik3c+44v1kQlIPFP6EjIbOvt/Lv7fHWD9JI/YzN4y1gK7C/VQdNGuikQyNg+5W3rg9ecYf9I5uLAQwY/hxeI3lbNsErebqKe2EbJ8AwcNIC0lDBz53Sq0ML89QapEuy3fB+upuctxLULVDCbNwIDAQAB";

/// Encodes a plaintext secret into the vendor's submittable credential form.
///
/// Pure and stateless: the public key is parsed once at construction, and
/// [`encode`](CredentialEncoder::encode) can then be called any number of
/// times.
///
/// # Examples
///
/// ```
/// use shinebridge::auth::CredentialEncoder;
///
/// let encoder = CredentialEncoder::vendor_default().unwrap();
/// let encoded = encoder.encode("hunter2").unwrap();
/// // RSA-2048 PKCS#1 v1.5 ciphertext is 256 bytes, so the base64 form is
/// // 344 characters.
/// assert_eq!(encoded.len(), 344);
/// ```
#[derive(Debug)]
pub struct CredentialEncoder {
    public_key: RsaPublicKey,
}

impl CredentialEncoder {
    /// Build an encoder from a base64-encoded SPKI DER public key.
    ///
    /// # Errors
    ///
    /// Returns [`ShinebridgeError::Encoding`] if the key material is not
    /// valid base64 or does not parse as an RSA public key.
    pub fn new(public_key_b64: &str) -> Result<Self> {
        let der = BASE64
            .decode(public_key_b64)
            .map_err(|e| ShinebridgeError::Encoding(format!("public key is not base64: {e}")))?;
        let public_key = RsaPublicKey::from_public_key_der(&der)
            .map_err(|e| ShinebridgeError::Encoding(format!("invalid RSA public key: {e}")))?;
        Ok(Self { public_key })
    }

    /// Build an encoder using the vendor's published public key.
    pub fn vendor_default() -> Result<Self> {
        Self::new(VENDOR_PUBLIC_KEY_B64)
    }

    /// Encrypt `secret` with RSA PKCS#1 v1.5 and return the base64 ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`ShinebridgeError::Encoding`] if the secret exceeds the
    /// key's block size. Secrets must be short; typical password lengths
    /// are fine (an RSA-2048 key fits up to 245 bytes).
    pub fn encode(&self, secret: &str) -> Result<String> {
        let mut rng = rand::thread_rng();
        let ciphertext = self
            .public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, secret.as_bytes())
            .map_err(|e| ShinebridgeError::Encoding(format!("encryption failed: {e}")))?;
        Ok(BASE64.encode(ciphertext))
    }
}
