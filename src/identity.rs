use hmac::{ Hmac, Mac };
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a WhatsApp sender id with a keyed HMAC so the raw phone number
/// never keys the conversation store.
pub fn uid_hash(salt: &str, sender: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(sender.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
