//! Session key codec.
//!
//! One key per session: a fixed table prefix followed by the session id in
//! big-endian. Session ids are non-negative (microsecond timestamps), so
//! big-endian encoding keeps store scan order equal to id order.

use graphion_protocol::SessionId;

const SESSION_PREFIX: &[u8] = b"__sessions__";

/// The fixed prefix covering every session key.
pub fn session_prefix() -> &'static [u8] {
    SESSION_PREFIX
}

/// Store key for one session.
pub fn session_key(session_id: SessionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(SESSION_PREFIX.len() + 8);
    key.extend_from_slice(SESSION_PREFIX);
    key.extend_from_slice(&session_id.to_be_bytes());
    key
}

/// Recover the session id from a store key, if it is a session key.
pub fn parse_session_key(key: &[u8]) -> Option<SessionId> {
    let suffix = key.strip_prefix(SESSION_PREFIX)?;
    let bytes: [u8; 8] = suffix.try_into().ok()?;
    Some(SessionId::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let id = 1_700_000_123_456_789_i64;
        assert_eq!(parse_session_key(&session_key(id)), Some(id));
    }

    #[test]
    fn test_key_order_matches_id_order() {
        let a = session_key(100);
        let b = session_key(101);
        let c = session_key(1 << 40);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_rejects_foreign_keys() {
        assert_eq!(parse_session_key(b"__users__root"), None);
        assert_eq!(parse_session_key(b"__sessions__short"), None);
    }

    #[test]
    fn test_keys_share_scan_prefix() {
        let key = session_key(42);
        assert!(key.starts_with(session_prefix()));
    }
}
