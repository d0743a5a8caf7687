use crate::{LedgerError, Result};
use tracing::info;

/// Known peers as `host[:port]` strings, kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    peers: Vec<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalises and stores `address`. Returns `false` if it was already known.
    pub fn register(&mut self, address: &str) -> Result<bool> {
        let peer = normalize_peer_address(address)?;
        Ok(self.insert(peer))
    }

    /// Registers every address or none of them.
    pub fn register_all<S: AsRef<str>>(&mut self, addresses: &[S]) -> Result<()> {
        let normalized = addresses
            .iter()
            .map(|a| normalize_peer_address(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for peer in normalized {
            self.insert(peer);
        }
        Ok(())
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    pub fn contains(&self, peer: &str) -> bool {
        self.peers.iter().any(|p| p == peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn insert(&mut self, peer: String) -> bool {
        if self.contains(&peer) {
            return false;
        }
        info!(%peer, "registered peer");
        self.peers.push(peer);
        true
    }
}

/// `http://10.0.0.5:5000/x` becomes `10.0.0.5:5000`; a string without a
/// `scheme://` or `//` prefix is kept verbatim (minus any query or fragment).
pub fn normalize_peer_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let (authority, path) = split_authority(trimmed);
    if let Some(netloc) = authority.filter(|a| !a.is_empty()) {
        return Ok(netloc.to_owned());
    }
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if !path.is_empty() {
        return Ok(path.to_owned());
    }
    Err(LedgerError::InvalidPeerAddress(address.to_owned()))
}

fn split_authority(s: &str) -> (Option<&str>, &str) {
    let rest = match s.find("://") {
        Some(i) if is_scheme(&s[..i]) => &s[i + 1..],
        _ => s,
    };
    match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
