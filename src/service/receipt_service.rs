use sha2::{Digest, Sha256};

pub fn receipt_number(fine_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fine_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("RCPT-{}", digest[..12].to_ascii_uppercase())
}
