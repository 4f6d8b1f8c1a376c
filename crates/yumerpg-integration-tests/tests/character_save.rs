//! A small game's worth of declarations, authored in each supported format,
//! driven through a save/load cycle with the builtin Constructors.

use rayon::prelude::*;
use yumerpg_builtin::effect::PropertyChangeComponent;
use yumerpg_builtin::model::RpgModel;
use yumerpg_builtin::property::PropertyValue;
use yumerpg_builtin::register_builtins;
use yumerpg_core::constructor::ConstructorRegistry;
use yumerpg_core::context::SerializeContext;
use yumerpg_core::document::{decode_elements, encode_elements};
use yumerpg_core::element::{ElementArray, ElementRegistry};
use yumerpg_core::format::{Format, parse_list};
use yumerpg_core::id::Id;
use yumerpg_core::json;

const GAME_JSON: &str = r#"[
    {"name": "level", "constructor": "PropertyComponent",
     "data": {"type": "int", "name": "level", "alias": "Lv", "value": 1}},
    {"name": "hp", "constructor": "RangePropertyComponent",
     "data": {"type": "long", "name": "hp", "maxValue": 120, "minValue": 0}},
    {"name": "speed", "constructor": "RangePropertyComponent",
     "data": {"type": "double", "name": "speed", "maxValue": 1.5, "minValue": 0.5, "value": 1.0}},
    {"name": "heal", "constructor": "PropertyChangeComponent",
     "data": {"changedProperty": "hp", "script": "target.hp + 30"}},
    {"name": "warrior", "constructor": "RpgModel",
     "data": {"meta": {"name": "Warrior", "class": "fighter"},
              "abilities": ["level", "hp", "speed"]}},
    {"name": "potion", "constructor": "RpgModel",
     "data": {"meta": {"name": "Potion"}, "abilities": "heal"}}
]"#;

const GAME_RON: &str = r#"[
    {"name": "level", "constructor": "PropertyComponent",
     "data": {"type": "int", "name": "level", "alias": "Lv", "value": 1}},
    {"name": "hp", "constructor": "RangePropertyComponent",
     "data": {"type": "long", "name": "hp", "maxValue": 120, "minValue": 0}},
    {"name": "speed", "constructor": "RangePropertyComponent",
     "data": {"type": "double", "name": "speed", "maxValue": 1.5, "minValue": 0.5, "value": 1.0}},
    {"name": "heal", "constructor": "PropertyChangeComponent",
     "data": {"changedProperty": "hp", "script": "target.hp + 30"}},
    {"name": "warrior", "constructor": "RpgModel",
     "data": {"meta": {"name": "Warrior", "class": "fighter"},
              "abilities": ["level", "hp", "speed"]}},
    {"name": "potion", "constructor": "RpgModel",
     "data": {"meta": {"name": "Potion"}, "abilities": "heal"}},
]"#;

const GAME_TOML: &str = r#"
[[elements]]
name = "level"
constructor = "PropertyComponent"
data = { type = "int", name = "level", alias = "Lv", value = 1 }

[[elements]]
name = "hp"
constructor = "RangePropertyComponent"
data = { type = "long", name = "hp", maxValue = 120, minValue = 0 }

[[elements]]
name = "speed"
constructor = "RangePropertyComponent"
data = { type = "double", name = "speed", maxValue = 1.5, minValue = 0.5, value = 1.0 }

[[elements]]
name = "heal"
constructor = "PropertyChangeComponent"
data = { changedProperty = "hp", script = "target.hp + 30" }

[[elements]]
name = "warrior"
constructor = "RpgModel"
data = { meta = { name = "Warrior", class = "fighter" }, abilities = ["level", "hp", "speed"] }

[[elements]]
name = "potion"
constructor = "RpgModel"
data = { meta = { name = "Potion" }, abilities = "heal" }
"#;

fn declarations(text: &str, format: Format) -> ElementArray {
    decode_elements(&parse_list(text, format, "elements").unwrap()).unwrap()
}

fn game() -> (ElementRegistry, ConstructorRegistry) {
    let mut elements = ElementRegistry::new();
    elements.register_all(declarations(GAME_JSON, Format::Json));
    let mut constructors = ConstructorRegistry::new();
    register_builtins(&mut constructors).unwrap();
    (elements, constructors)
}

fn id(name: &str) -> Id {
    Id::from_name(name).unwrap()
}

#[test]
fn every_format_declares_the_same_game() {
    let json = declarations(GAME_JSON, Format::Json);
    assert_eq!(json.len(), 6);
    assert_eq!(declarations(GAME_RON, Format::Ron), json);
    assert_eq!(declarations(GAME_TOML, Format::Toml), json);
}

#[test]
fn declarations_survive_reencoding() {
    let json = declarations(GAME_JSON, Format::Json);
    assert_eq!(decode_elements(&encode_elements(&json)).unwrap(), json);
}

#[test]
fn new_character_starts_from_declarations() {
    let (elements, constructors) = game();
    let codec = SerializeContext::new(&elements, &constructors);
    let object = codec.construct(id("warrior"), None).unwrap();
    let warrior = object.downcast_ref::<RpgModel>().unwrap();

    assert_eq!(warrior.element_id, id("warrior"));
    assert_eq!(warrior.property_value("level"), Some(&PropertyValue::Long(1)));
    assert_eq!(warrior.property("level").unwrap().alias.as_deref(), Some("Lv"));
    assert_eq!(warrior.range_property("hp").unwrap().long().unwrap().value(), 120);
    assert_eq!(warrior.range_property("speed").unwrap().double().unwrap().value(), 1.0);
}

#[test]
fn party_save_round_trip() {
    let (elements, constructors) = game();
    let codec = SerializeContext::new(&elements, &constructors);

    let save = r#"[{"element": "warrior"}, {"element": "warrior"}, {"element": "potion"}]"#;
    let mut object = json::decode_objects(codec, save).unwrap();
    {
        let members = object.as_array_mut().unwrap();
        let mut warriors = members.iter_of_mut::<RpgModel>();
        let first = warriors.next().unwrap();
        first.property_mut("level").unwrap().set(12).unwrap();
        first.range_property_mut("hp").unwrap().long_mut().unwrap().set(45);
        let second = warriors.next().unwrap();
        second.range_property_mut("speed").unwrap().double_mut().unwrap().set(9.0);
    }

    let text = json::encode_objects_pretty(codec, object.as_ref()).unwrap();
    let reloaded = json::decode_objects(codec, &text).unwrap();
    assert!(reloaded.dyn_eq(object.as_ref()));

    let members: Vec<&RpgModel> = reloaded.as_array().unwrap().iter_of::<RpgModel>().collect();
    assert_eq!(members.len(), 3);
    assert_eq!(members[0].property_value("level"), Some(&PropertyValue::Long(12)));
    assert_eq!(members[0].range_property("hp").unwrap().long().unwrap().value(), 45);
    assert_eq!(members[1].range_property("speed").unwrap().double().unwrap().value(), 1.5);

    let heal = members[2].ability::<PropertyChangeComponent>().unwrap();
    assert_eq!(heal.changed_property, "hp");
    assert!(text.contains(&id("warrior").to_string()));
}

#[test]
fn save_entries_must_be_instances() {
    let (elements, constructors) = game();
    let codec = SerializeContext::new(&elements, &constructors);
    let err = json::decode_objects(codec, r#"[{"element": "warrior"}, "potion"]"#).unwrap_err();
    assert!(err.to_string().starts_with("entry 1:"), "{err}");
}

#[test]
fn ephemeral_effects_are_not_written() {
    let (elements, constructors) = game();
    let codec = SerializeContext::new(&elements, &constructors);
    let potion = codec.construct(id("potion"), None).unwrap();
    let text = json::encode_objects(codec, potion.as_ref()).unwrap();
    assert!(!text.contains("script"));
    assert!(text.contains(r#""data":{}"#));
}

#[test]
fn independent_saves_load_concurrently() {
    let (elements, constructors) = game();
    let codec = SerializeContext::new(&elements, &constructors);

    let saves: Vec<String> = (0..32)
        .map(|level| {
            format!(
                r#"{{"element": "warrior", "data": {{"abilities": [
                    {{"element": "level", "data": {{"value": {level}}}}}, "hp", "speed"]}}}}"#
            )
        })
        .collect();

    let levels: Vec<i64> = saves
        .par_iter()
        .map(|save| {
            let object = json::decode_objects(codec, save).unwrap();
            let warrior = object.downcast_ref::<RpgModel>().unwrap();
            warrior.property_value("level").and_then(PropertyValue::as_long).unwrap()
        })
        .collect();
    assert_eq!(levels, (0..32).collect::<Vec<_>>());
}
