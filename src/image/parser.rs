use serde::{Deserialize, Serialize};

const DEFAULT_REGISTRY: &str = "docker.io";
const DEFAULT_TAG: &str = "latest";

/// Parsed coordinates of a container image reference. Constructed once per
/// raw image string and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub registry: String,
    pub repository: String,
    pub tag: String,
    pub digest: Option<String>,
    /// Canonical identifier: `registry/repository:tag`, or
    /// `registry/repository@digest` when a digest is present.
    pub full_name: String,
}

impl ImageReference {
    /// Parse a raw image string into its components. Total: unrecognized
    /// shapes fall back to defaults rather than failing, and no character-set
    /// validation is applied to registry or repository.
    ///
    /// `nginx` -> docker.io/library/nginx:latest
    /// `myuser/app` -> docker.io/myuser/app:latest
    /// `registry.example.com/app:v1` -> registry.example.com/app:v1
    /// `nginx@sha256:abc` -> docker.io/library/nginx@sha256:abc
    pub fn parse(raw: &str) -> Self {
        // Digest form: keep the digest verbatim with its sha256: prefix.
        let (mut remainder, digest) = match raw.split_once("@sha256:") {
            Some((base, hex)) => (base, Some(format!("sha256:{}", hex))),
            None => (raw, None),
        };

        // Right-most split so a registry host:port prefix is not mistaken
        // for a tag separator. A colon followed by a '/' is a port, not a tag.
        let mut tag = DEFAULT_TAG.to_string();
        if let Some(idx) = remainder.rfind(':') {
            if !remainder[idx + 1..].contains('/') {
                tag = remainder[idx + 1..].to_string();
                remainder = &remainder[..idx];
            }
        }

        let parts: Vec<&str> = remainder.split('/').collect();
        let (registry, repository) = match parts.len() {
            1 => (DEFAULT_REGISTRY.to_string(), format!("library/{}", parts[0])),
            2 => {
                // A first segment with '.' or ':' is a registry host; anything
                // else is a namespace under the default registry.
                if parts[0].contains('.') || parts[0].contains(':') {
                    (parts[0].to_string(), parts[1].to_string())
                } else {
                    (DEFAULT_REGISTRY.to_string(), format!("{}/{}", parts[0], parts[1]))
                }
            }
            _ => (parts[0].to_string(), parts[1..].join("/")),
        };

        // Digest takes precedence over the tag in the canonical form.
        let full_name = match &digest {
            Some(digest) => format!("{}/{}@{}", registry, repository, digest),
            None => format!("{}/{}:{}", registry, repository, tag),
        };

        Self { registry, repository, tag, digest, full_name }
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name)
    }
}
