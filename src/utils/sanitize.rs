/// Sanitize an image name for use as a storage key.
///
/// Replaces the image-reference separators '/', ':' and '@' with underscores,
/// then replaces anything outside [alphanumeric, '-', '_', '.'] with an
/// underscore. The same function is used for blob paths and metadata rows so
/// the two tiers join on identical keys.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | ':' | '@' => '_',
            c if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_image_with_tag() {
        assert_eq!(sanitize_name("docker.io/library/nginx:latest"), "docker.io_library_nginx_latest");
    }

    #[test]
    fn test_sanitize_image_with_digest() {
        assert_eq!(sanitize_name("gcr.io/p/app@sha256:abc"), "gcr.io_p_app_sha256_abc");
    }

    #[test]
    fn test_sanitize_keeps_allowed_chars() {
        assert_eq!(sanitize_name("a-b_c.d9"), "a-b_c.d9");
    }

    #[test]
    fn test_sanitize_replaces_everything_else() {
        assert_eq!(sanitize_name("a b#c%d"), "a_b_c_d");
    }
}
