use once_cell::sync::Lazy;

use super::Category;

/// Built-in sport groups: (name, prompts)
const BUILTIN_DEFINITIONS: &[(&str, &[&str])] = &[
    (
        "AquaticSports",
        &[
            "swimming competition",
            "diving event",
            "water polo match",
            "synchronized swimming",
            "open water swimming",
        ],
    ),
    (
        "AthleticEvents",
        &[
            "track and field",
            "marathon running",
            "long jump competition",
            "javelin throw",
            "high jump event",
        ],
    ),
    (
        "GymnasticsEvents",
        &[
            "artistic gymnastics",
            "rhythmic gymnastics",
            "trampoline gymnastics",
            "balance beam routine",
            "floor exercise performance",
        ],
    ),
    (
        "CombatSports",
        &[
            "boxing match",
            "judo competition",
            "wrestling bout",
            "taekwondo fight",
            "fencing duel",
        ],
    ),
    (
        "TeamSports",
        &[
            "basketball game",
            "volleyball match",
            "football (soccer) match",
            "handball game",
            "field hockey competition",
        ],
    ),
    (
        "CyclingSports",
        &[
            "road cycling race",
            "track cycling event",
            "mountain bike competition",
            "BMX racing",
            "cycling time trial",
        ],
    ),
    (
        "RacquetSports",
        &[
            "tennis match",
            "badminton game",
            "table tennis competition",
            "squash game",
            "tennis doubles match",
        ],
    ),
    (
        "RowingAndSailing",
        &[
            "rowing competition",
            "sailing race",
            "canoe sprint",
            "kayak event",
            "windsurfing competition",
        ],
    ),
];

static BUILTIN_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    BUILTIN_DEFINITIONS
        .iter()
        .map(|(name, prompts)| {
            Category::new(*name, prompts.iter().map(|p| p.to_string()).collect())
        })
        .collect()
});

/// The fixed taxonomy, built once per process
pub fn builtin_categories() -> &'static [Category] {
    &BUILTIN_CATEGORIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_taxonomy_shape() {
        let categories = builtin_categories();
        assert_eq!(categories.len(), 8);
        assert_eq!(categories[0].name, "AquaticSports");
        assert_eq!(categories[7].name, "RowingAndSailing");
        assert!(categories.iter().all(|c| c.prompts.len() == 5));
    }

    #[test]
    fn test_builtin_is_memoized() {
        let first = builtin_categories().as_ptr();
        let second = builtin_categories().as_ptr();
        assert_eq!(first, second);
    }
}
