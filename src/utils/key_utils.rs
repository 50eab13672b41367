use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub struct PhotoKey;

impl PhotoKey {
    /// Document id for a photo URL: the standard base64 encoding with every
    /// character outside `[A-Za-z0-9]` dropped, since `/`, `+` and `=` are not
    /// valid in document ids.
    pub fn derive(photo_url: &str) -> String {
        STANDARD.encode(photo_url.as_bytes())
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_known_values() {
        assert_eq!(PhotoKey::derive("hello"), "aGVsbG8");
        assert_eq!(PhotoKey::derive("https://x/y/photo_1.jpg"), "aHR0cHM6Ly94L3kvcGhvdG9fMS5qcGc");
    }

    #[test]
    fn test_derive_is_stable() {
        let url = "https://storage.googleapis.com/baby-birthday-photos/baby-journey/month_3/photo_1.jpg";
        assert_eq!(PhotoKey::derive(url), PhotoKey::derive(url));
        assert!(PhotoKey::derive(url).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_derive_distinct_for_gallery_urls() {
        let urls = [
            "https://storage.googleapis.com/baby-birthday-photos/baby-journey/month_3/photo_1.jpg",
            "https://storage.googleapis.com/baby-birthday-photos/baby-journey/month_3/photo_2.jpg",
            "https://storage.googleapis.com/baby-birthday-photos/baby-journey/month_3/photo1.jpg",
            "https://storage.googleapis.com/baby-birthday-photos/best-photos/first_steps/photo_1.jpg",
            "https://via.placeholder.com/500x400/FFE5F1/FF6B9D?text=%F0%9F%93%B8%20Month%203%0APhoto%201",
            "https://via.placeholder.com/500x400/FFE5F1/FF6B9D?text=%F0%9F%93%B8%20Month%203%0APhoto%202",
        ];
        let keys = urls.iter().map(|x| PhotoKey::derive(x)).collect::<std::collections::HashSet<_>>();
        assert_eq!(keys.len(), urls.len());
    }
}
