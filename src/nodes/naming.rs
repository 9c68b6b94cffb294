//! Display names of repeatable sockets

/// Name of the connected socket ranked `rank` (1-based) within its family
pub fn name_for_rank(family_prefix: &str, rank: usize) -> String {
    format!("{}_{}", family_prefix, rank)
}

/// Sentinel name carried by a family socket until something is connected
pub fn bare_name(family_prefix: &str) -> String {
    format!("{}_", family_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_names() {
        assert_eq!(name_for_rank("image", 1), "image_1");
        assert_eq!(name_for_rank("image", 12), "image_12");
    }

    #[test]
    fn test_bare_name_is_a_prefix_of_every_ranked_name() {
        let bare = bare_name("image");
        assert_eq!(bare, "image_");
        assert!(name_for_rank("image", 3).starts_with(&bare));
        assert_ne!(bare, name_for_rank("image", 1));
    }
}
