//! Scene keyword extraction stand-in.
//!
//! Real deployments feed keywords from the scene-analysis collaborator;
//! this fallback derives one keyword set per paragraph so the media fetch
//! step has something to search for when no analysis is attached.

/// Keywords taken per scene.
const KEYWORDS_PER_SCENE: usize = 3;

/// Words shorter than this carry little search signal.
const MIN_KEYWORD_LEN: usize = 5;

/// One keyword set per paragraph of the script.
pub fn scene_keywords(script: &str) -> Vec<Vec<String>> {
    script
        .split("\n\n")
        .filter_map(|paragraph| {
            let keywords: Vec<String> = paragraph
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                .filter(|w| w.len() >= MIN_KEYWORD_LEN)
                .take(KEYWORDS_PER_SCENE)
                .collect();

            if keywords.is_empty() {
                None
            } else {
                Some(keywords)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_keyword_set_per_paragraph() {
        let script = "Photosynthesis converts light energy.\n\nChlorophyll absorbs sunlight well.";
        let scenes = scene_keywords(script);

        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0], vec!["photosynthesis", "converts", "light"]);
        assert!(scenes[1].contains(&"chlorophyll".to_string()));
    }

    #[test]
    fn test_short_words_are_dropped() {
        let scenes = scene_keywords("a an the of cat");
        assert!(scenes.is_empty());
    }

    #[test]
    fn test_punctuation_is_trimmed() {
        let scenes = scene_keywords("Mitochondria, organelles!");
        assert_eq!(scenes[0], vec!["mitochondria", "organelles"]);
    }
}
