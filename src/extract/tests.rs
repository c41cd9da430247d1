use super::*;

const CARD_URL: &str = "https://dokkaninfo.com/cards/4011";

const CARD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Super Saiyan Goku | DokkanInfo</title><script>window.x = "Leader Skill";</script></head>
<body>
<h1>Super Saiyan Goku</h1>
<div class="card-icon-item card-icon-item-rarity card-info-above-thumb"><img src="/assets/layout/cha_rare_sm_lr.png"></div>
<div class="row justify-content-center align-items-center padding-top-bottom-10 border border-2 border-teq bg-str"><span>Card</span></div>
<div class="release">
  <div>Release Date</div><div>01/27/2023 12:00:00 AM PST</div>
  <div>EZA Release Date</div><div>06/01/2024 01:00:00 PM PST</div>
</div>
<div>Leader Skill</div>
<div>"Exploding Rage" Category Ki +3 and HP, ATK &amp; DEF +170% "Exploding Rage" Category Ki +3 and HP, ATK &amp; DEF +170%</div>
<div>Super Attack</div>
<div>Kamehameha</div>
<div>Causes immense damage to enemy</div>
<div>SA Lv: 15</div>
<div>50%</div>
<div>Raises ATK &amp; DEF Causes supreme damage</div>
<div>Ultra Super Attack</div>
<div>Super Kamehameha</div>
<div>Causes mega-colossal damage</div>
<div class="row"><div class="col-sm-4"><b>Passive Skill</b></div><div class="col-sm-8"><b>Saiyan Pride</b></div></div>
<div class="row bg-str-2"><div class="col">
  <ul><li>Orphan effect</li></ul>
  <strong>Basic effect(s)</strong>
  <ul><li>ATK +100%</li><li>ATK   +100%</li><li>DEF <img src="/assets/arrow.png" alt="up green arrow"> 50%</li></ul>
  <strong>When attacking</strong>
  <ul><li>Guard activated</li></ul>
</div></div>
<div>Active Skill</div>
<div>Final Flash</div>
<div>Causes ultimate damage</div>
<div>ATK +50% for 1 turn</div>
<div>Activation Condition(s)</div>
<div>Can be activated when HP is 50% or less</div>
<div class="categories">
  <span>Categories</span>
  <a href="/categories/12"><img src="/assets/card_category/label/card_category_label_12.png" alt="Saiyans"></a>
  <a href="/categories/30">Realm of Gods</a>
  <img src="/assets/layout/icon.png" alt="icon">
  <span>Link Skills</span>
  <span>Super Saiyan</span>
  <span>Prodigies</span>
  <span>Super Saiyan</span>
</div>
<table>
  <tr><th>Stats</th><th>Base Min</th><th>Base Max</th><th>55%</th><th>100%</th></tr>
  <tr><th>HP</th><td>100</td><td>200</td><td>150</td><td>300</td></tr>
  <tr><th>ATK</th><td>1,000</td><td>2,000</td><td>-</td><td>3,000</td></tr>
  <tr><td>Note</td><td>7</td></tr>
</table>
<div>Cost: 58</div>
<div>Max Lv: 150</div>
<div class="border border-agl">
  <div class="row"><div class="col"><b>Domain Effect(s)</b></div><div class="col"><b>Twin Dragon Shrine</b></div></div>
  <div class="row"><div class="bg-agl-2">ATK +30% for allies</div></div>
</div>
<div class="border border-agl">
  <div class="row"><div class="col"><b>Domain Effect(s)</b></div><div class="col"><b>Twin Dragon Shrine</b></div></div>
  <div class="row"><div class="bg-agl-2">ATK +30% for allies</div></div>
</div>
<div class="row"><div>PRE-EZA</div><div>EZA</div></div>
<div class="row"><span>Step:</span><span class="multiselect__single">4</span></div>
<div class="row cursor-pointer unselectable border border-2 border-dark margin-top-bottom-5">
  <div class="col-5"><img src="/assets/thumb/card_4011_thumb.png"></div>
  <div class="col-5"><img src="/assets/thumb/card_4012_thumb.png"></div>
  <div class="col-5"><img src="/assets/thumb/card_4013_thumb.png"></div>
  <div class="col-5"><img src="/assets/thumb/card_4012_thumb.png"></div>
</div>
<img src="/assets/character/card/4011/card_4011_character.png">
<img src="/assets/layout/cha_type_icon_12.png">
</body>
</html>"#;

fn extract_fixture() -> CardExtraction {
    let parser = CardParser::new().expect("parser");
    parser.extract(CARD_PAGE, CARD_URL, CARD_URL)
}

#[test]
fn identity_fields_come_from_heading_url_and_icons() {
    let extraction = extract_fixture();

    assert_eq!(extraction.character_id.as_deref(), Some("4011"));
    assert_eq!(extraction.display_name.as_deref(), Some("Super Saiyan Goku"));
    assert_eq!(
        extraction.page_title.as_deref(),
        Some("Super Saiyan Goku | DokkanInfo")
    );
    assert_eq!(extraction.rarity.expect("rarity"), Some(Rarity::LR));
    assert_eq!(extraction.type_token.expect("type"), Some(CardType::Str));
    assert_eq!(
        extraction.type_icon_filename.as_deref(),
        Some("cha_type_icon_12.png")
    );
}

#[test]
fn image_urls_are_absolute_and_distinct() {
    let extraction = extract_fixture();

    assert_eq!(
        extraction.image_urls.first().map(String::as_str),
        Some("https://dokkaninfo.com/assets/layout/cha_rare_sm_lr.png")
    );
    let mut sorted = extraction.image_urls.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), extraction.image_urls.len());
    assert!(
        extraction
            .image_urls
            .iter()
            .all(|url| url.starts_with("https://dokkaninfo.com/"))
    );
}

#[test]
fn related_ids_skip_the_current_card_tile() {
    let extraction = extract_fixture();
    assert_eq!(extraction.related_card_ids, vec!["4012", "4013"]);
}

#[test]
fn leader_skill_collapses_doubled_category_phrase() {
    let extraction = extract_fixture();
    assert_eq!(
        extraction.leader_skill.expect("leader").as_deref(),
        Some(r#""Exploding Rage" Category Ki +3 and HP, ATK & DEF +170%"#)
    );
}

#[test]
fn super_attack_effect_drops_level_and_percentage_lines() {
    let extraction = extract_fixture();

    let super_attack = extraction.super_attack.expect("super attack");
    assert_eq!(super_attack.name.as_deref(), Some("Kamehameha"));
    assert_eq!(
        super_attack.effect.as_deref(),
        Some("Causes immense damage to enemy; Raises ATK & DEF; Causes supreme damage")
    );

    let ultra = extraction.ultra_super_attack.expect("ultra");
    assert_eq!(ultra.name.as_deref(), Some("Super Kamehameha"));
    assert_eq!(ultra.effect.as_deref(), Some("Causes mega-colossal damage"));
}

#[test]
fn super_attack_falls_back_to_text_run_without_header_line() {
    let parser = CardParser::new().expect("parser");
    let html = "<html><body><p>Super Attack Kamehameha</p><p>Causes huge damage</p>\
                <p>Ultra Super Attack</p><p>Big Bang</p></body></html>";

    let extraction = parser.extract(html, CARD_URL, CARD_URL);
    let super_attack = extraction.super_attack.expect("super attack");

    assert_eq!(super_attack.name.as_deref(), Some("Kamehameha"));
    assert_eq!(super_attack.effect.as_deref(), Some("Causes huge damage"));
}

#[test]
fn passive_sections_follow_strong_labels() {
    let extraction = extract_fixture();
    let passive = extraction.passive_skill.expect("passive");

    assert_eq!(passive.name.as_deref(), Some("Saiyan Pride"));
    assert_eq!(passive.sections.len(), 2);
    assert_eq!(passive.sections[0].condition.as_deref(), Some("Basic effect(s)"));
    assert_eq!(passive.sections[0].effects, vec!["ATK +100%", "DEF ↑50%"]);
    assert_eq!(passive.sections[1].condition.as_deref(), Some("When attacking"));
    assert_eq!(passive.sections[1].effects, vec!["Guard activated"]);
}

#[test]
fn blank_strong_label_keeps_items_in_the_open_section() {
    let parser = CardParser::new().expect("parser");
    let html = r#"<html><body>
<div class="row"><div class="col-sm-4"><b>Passive Skill</b></div><div class="col-sm-8"><b>Focus</b></div></div>
<div class="row bg-teq-2"><div class="col">
  <strong>Basic effect(s)</strong>
  <ul><li>ATK +50%</li></ul>
  <strong>   </strong>
  <ul><li>Ki +2</li></ul>
</div></div>
</body></html>"#;
    let extraction = parser.extract(html, CARD_URL, CARD_URL);
    let passive = extraction.passive_skill.expect("passive");

    assert_eq!(passive.sections.len(), 1);
    assert_eq!(passive.sections[0].condition.as_deref(), Some("Basic effect(s)"));
    assert_eq!(passive.sections[0].effects, vec!["ATK +50%", "Ki +2"]);
}

#[test]
fn active_skill_and_conditions_come_from_their_sections() {
    let extraction = extract_fixture();

    let active = extraction.active_skill.expect("active");
    assert_eq!(active.name.as_deref(), Some("Final Flash"));
    assert_eq!(
        active.effect.as_deref(),
        Some("Causes ultimate damage; ATK +50% for 1 turn")
    );
    assert_eq!(
        extraction.activation_conditions.expect("conditions").as_deref(),
        Some("Can be activated when HP is 50% or less")
    );
}

#[test]
fn links_and_categories_are_distinct_and_filtered() {
    let extraction = extract_fixture();

    assert_eq!(
        extraction.link_skills.expect("links"),
        vec!["Super Saiyan", "Prodigies"]
    );
    assert_eq!(
        extraction.categories.expect("categories"),
        vec!["Saiyans", "Realm of Gods"]
    );
}

#[test]
fn stats_table_rows_pair_cells_with_column_labels() {
    let extraction = extract_fixture();
    let stats = extraction.stats.expect("stats");

    assert_eq!(stats.general.cost, Some(58));
    assert_eq!(stats.general.max_level, Some(150));
    assert_eq!(stats.general.super_attack_level, Some(15));

    let hp = &stats.rows["HP"];
    assert_eq!(hp["Base Min"], 100);
    assert_eq!(hp["Base Max"], 200);
    assert_eq!(hp["55%"], 150);
    assert_eq!(hp["100%"], 300);

    let atk = &stats.rows["ATK"];
    assert_eq!(atk["Base Min"], 1000);
    assert!(!atk.contains_key("55%"));
    assert!(!stats.rows.contains_key("Note"));
}

#[test]
fn stats_fall_back_to_text_rows_without_a_table() {
    let parser = CardParser::new().expect("parser");
    let html = "<html><body><div>Stats</div><div>HP 1,000 2,000 3,000 4,000</div>\
                <div>DEF 10 20 30 40</div></body></html>";

    let stats = parser
        .extract(html, CARD_URL, CARD_URL)
        .stats
        .expect("stats");

    assert_eq!(stats.rows["HP"]["Base Max"], 2000);
    assert_eq!(stats.rows["DEF"]["100%"], 40);
    assert!(!stats.rows.contains_key("ATK"));
}

#[test]
fn release_date_and_timezone_are_split() {
    let extraction = extract_fixture();
    let release = extraction.release.expect("release");

    assert_eq!(release.release_date.as_deref(), Some("01/27/2023 12:00:00 AM"));
    assert_eq!(release.timezone.as_deref(), Some("PST"));
}

#[test]
fn duplicate_domain_blocks_collapse_to_one() {
    let extraction = extract_fixture();

    assert_eq!(
        extraction.domains.expect("domains"),
        vec![DomainEffect {
            name: Some("Twin Dragon Shrine".to_string()),
            effect: Some("ATK +30% for allies".to_string()),
            domain_type: Some("AGL".to_string()),
        }]
    );
}

#[test]
fn domain_effect_is_found_in_nested_columns() {
    let parser = CardParser::new().expect("parser");
    let html = r#"<html><body>
<div class="border border-2 border-int">
  <div class="row"><div class="col"><b>Domain Effect(s)</b></div><div class="col"><b>Hyperbolic Time Chamber</b></div></div>
  <div class="row"><div class="col-12"><div class="bg-int-2">DEF +40% for all allies</div></div></div>
</div>
</body></html>"#;
    let extraction = parser.extract(html, CARD_URL, CARD_URL);

    assert_eq!(
        extraction.domains.expect("domains"),
        vec![DomainEffect {
            name: Some("Hyperbolic Time Chamber".to_string()),
            effect: Some("DEF +40% for all allies".to_string()),
            domain_type: Some("INT".to_string()),
        }]
    );
}

#[test]
fn type_token_uses_last_type_class_in_attribute_order() {
    let parser = CardParser::new().expect("parser");
    let html = r#"<html><body>
<div class="row justify-content-center align-items-center padding-top-bottom-10 border border-2 border-agl bg-phy"><span>Card</span></div>
</body></html>"#;
    let extraction = parser.extract(html, CARD_URL, CARD_URL);

    assert_eq!(extraction.type_token.expect("type"), Some(CardType::Phy));
}

#[test]
fn eza_step_four_marks_super_eza() {
    let extraction = extract_fixture();
    let eza = extraction.eza.expect("eza");

    assert!(eza.has_eza);
    assert_eq!(eza.eza_step, Some(4));
    assert!(eza.is_seza);
    assert_eq!(
        eza.original_release_date.as_deref(),
        Some("01/27/2023 12:00:00 AM PST")
    );
    assert_eq!(
        eza.eza_release_date.as_deref(),
        Some("06/01/2024 01:00:00 PM PST")
    );
}

#[test]
fn bare_page_yields_defaults_instead_of_errors() {
    let parser = CardParser::new().expect("parser");
    let extraction = parser.extract("<html><body><p>nothing</p></body></html>", "about:blank", "about:blank");

    assert!(extraction.character_id.is_none());
    assert!(extraction.leader_skill.expect("leader").is_none());
    assert_eq!(extraction.super_attack.expect("sa"), AttackSkill::default());
    assert!(extraction.link_skills.expect("links").is_empty());
    assert!(extraction.categories.expect("categories").is_empty());
    assert!(extraction.stats.expect("stats").rows.is_empty());
    assert!(!extraction.eza.expect("eza").has_eza);
    assert!(extraction.related_card_ids.is_empty());
}

#[test]
fn character_id_comes_from_first_numeric_card_segment() {
    assert_eq!(
        character_id_from_url("https://dokkaninfo.com/cards/1234?lang=en"),
        Some("1234".to_string())
    );
    assert_eq!(
        character_id_from_url("https://dokkaninfo.com/cards/new/cards/55"),
        Some("55".to_string())
    );
    assert_eq!(character_id_from_url("https://dokkaninfo.com/cards"), None);
}
