use crate::model::AssetCategories;

const CARD_ART_PATH: &str = "/character/card/";

/// Buckets a record's image URLs into rarity, type and card-art slots.
/// URLs naming the character id win; `/character/card/` URLs only fill
/// slots that are still empty. The first URL to fill a slot keeps it.
/// Matching ignores case; slots keep the URL as written.
pub fn classify_assets(character_id: Option<&str>, image_urls: &[String]) -> AssetCategories {
    let mut assets = AssetCategories::default();

    let character_id = character_id
        .filter(|id| !id.is_empty())
        .map(str::to_ascii_lowercase);
    let lowered: Vec<(String, &String)> = image_urls
        .iter()
        .map(|url| (url.to_ascii_lowercase(), url))
        .collect();

    for (key, url) in &lowered {
        if key.contains("cha_rare_sm_") || key.contains("cha_rare_") {
            fill(&mut assets.rarity, url);
        } else if key.contains("cha_type_icon_") {
            fill(&mut assets.card_type, url);
        } else if character_id.as_deref().is_some_and(|id| key.contains(id)) {
            fill_card_art(&mut assets, key, url);
        }
    }

    for (key, url) in lowered.iter().filter(|(key, _)| key.contains(CARD_ART_PATH)) {
        fill_card_art(&mut assets, key, url);
    }

    assets
}

/// `key` is the lowercased URL used for matching; `url` is what gets stored.
fn fill_card_art(assets: &mut AssetCategories, key: &str, url: &str) {
    let slot = if key.contains("_bg.") {
        &mut assets.background
    } else if key.contains("_character.") {
        &mut assets.character
    } else if key.contains("_effect.") {
        &mut assets.effect
    } else if key.contains("_cutin.") {
        &mut assets.cutin
    } else {
        return;
    };
    fill(slot, url);
}

fn fill(slot: &mut Option<String>, url: &str) {
    if slot.is_none() {
        *slot = Some(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn id_qualified_art_wins_over_generic_card_art() {
        let images = urls(&[
            "https://x/character/card/1000/card_1000_bg.png",
            "https://x/assets/card_4011_bg.png",
            "https://x/assets/card_4011_character.png",
            "https://x/assets/card_4011_character_alt.png",
            "https://x/character/card/1000/card_1000_cutin.png",
            "https://x/layout/cha_rare_sm_lr.png",
            "https://x/layout/cha_type_icon_12.png",
        ]);

        let assets = classify_assets(Some("4011"), &images);

        assert_eq!(assets.background.as_deref(), Some("https://x/assets/card_4011_bg.png"));
        assert_eq!(
            assets.character.as_deref(),
            Some("https://x/assets/card_4011_character.png")
        );
        assert_eq!(
            assets.cutin.as_deref(),
            Some("https://x/character/card/1000/card_1000_cutin.png")
        );
        assert!(assets.effect.is_none());
        assert_eq!(assets.rarity.as_deref(), Some("https://x/layout/cha_rare_sm_lr.png"));
        assert_eq!(assets.card_type.as_deref(), Some("https://x/layout/cha_type_icon_12.png"));
    }

    #[test]
    fn uppercase_urls_match_but_keep_their_spelling() {
        let images = urls(&[
            "https://x/Assets/Layout/CHA_RARE_SM_UR.PNG",
            "https://x/Character/Card/4011/CARD_4011_BG.PNG",
            "https://x/assets/Card_4011_Cutin.png",
        ]);

        let assets = classify_assets(Some("4011"), &images);

        assert_eq!(
            assets.rarity.as_deref(),
            Some("https://x/Assets/Layout/CHA_RARE_SM_UR.PNG")
        );
        assert_eq!(
            assets.background.as_deref(),
            Some("https://x/Character/Card/4011/CARD_4011_BG.PNG")
        );
        assert_eq!(
            assets.cutin.as_deref(),
            Some("https://x/assets/Card_4011_Cutin.png")
        );
    }

    #[test]
    fn missing_id_falls_back_to_card_art_path() {
        let images = urls(&["https://x/character/card/77/card_77_effect.png"]);
        let assets = classify_assets(None, &images);
        assert_eq!(
            assets.effect.as_deref(),
            Some("https://x/character/card/77/card_77_effect.png")
        );
    }
}
