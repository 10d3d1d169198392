use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `path` under `secret`, used as the download token of a blob.
pub fn sign_path(secret: &str, path: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(path.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_path(secret: &str, path: &str, token: &str) -> bool {
    let expected = sign_path(secret, path);
    let provided = token.to_ascii_lowercase();
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_bound_to_path_and_secret() {
        let token = sign_path("secret", "cvs/a/1_cv.pdf");
        assert!(verify_path("secret", "cvs/a/1_cv.pdf", &token));
        assert!(verify_path("secret", "cvs/a/1_cv.pdf", &token.to_uppercase()));
        assert!(!verify_path("secret", "cvs/a/2_cv.pdf", &token));
        assert!(!verify_path("other", "cvs/a/1_cv.pdf", &token));
        assert!(!verify_path("secret", "cvs/a/1_cv.pdf", ""));
    }
}
