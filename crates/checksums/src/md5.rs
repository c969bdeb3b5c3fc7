use digest::Digest;
use std::fmt::Write as _;

/// Streaming MD5 hasher used to verify file integrity across a distortion
/// session.
#[derive(Clone, Debug)]
pub struct Md5 {
    inner: md5::Md5,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: md5::Md5::new(),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the digest and returns the 128-bit MD5 output.
    #[must_use]
    pub fn finalize(self) -> [u8; 16] {
        self.inner.finalize().into()
    }

    /// Convenience helper that computes the MD5 digest for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 16] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Renders a digest as the lowercase hex string carried in frame
    /// payloads (`md5`, `newMd5`).
    #[must_use]
    pub fn to_hex(digest: &[u8; 16]) -> String {
        let mut out = String::with_capacity(32);
        for byte in digest {
            write!(&mut out, "{byte:02x}").expect("write! to String cannot fail");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_streaming_matches_rfc_vectors() {
        let vectors = [
            (b"".as_slice(), "d41d8cd98f00b204e9800998ecf8427e"),
            (b"a".as_slice(), "0cc175b9c0f1b6a831c399e269772661"),
            (b"abc".as_slice(), "900150983cd24fb0d6963f7d28e17f72"),
            (
                b"message digest".as_slice(),
                "f96b697d7cb7938d525a2f31aaf161d0",
            ),
        ];

        for (input, expected_hex) in vectors {
            let mut hasher = Md5::new();
            let mid = input.len() / 2;
            hasher.update(&input[..mid]);
            hasher.update(&input[mid..]);
            let digest = hasher.finalize();
            assert_eq!(Md5::to_hex(&digest), expected_hex);

            let one_shot = Md5::digest(input);
            assert_eq!(Md5::to_hex(&one_shot), expected_hex);
        }
    }

    #[test]
    fn hello_world_matches_scenario_vector() {
        let digest = Md5::digest(b"Hello World.\n");
        assert_eq!(Md5::to_hex(&digest), "770b95bb61d5b0406c135b6e42260580");
    }
}
