//! Booklet assembly: gaps, asset layering and custom resolvers

use pretty_assertions::assert_eq;
use typikon_core::prelude::*;
use typikon_core::{ResolverInput, ResolverOutput};
use typikon_structure::ResolverId;
use typikon_test_utils::{init_test_tracing, ymd};

const RULES: &str = include_str!("../data/rules.json");
const TEMPLATES: &str = include_str!("../data/templates.json");
const DAILY_CYCLE: &str = include_str!("../data/daily_cycle.json");

#[test]
fn missing_texts_become_placeholders() {
    init_test_tracing();
    // Wednesday with no fixed-date entry: the saint of the day has no texts
    let document = Typikon::builtin().unwrap().generate(ymd(2024, 9, 4)).unwrap().document;

    assert!(!document.is_complete());
    let gap = document
        .gaps
        .iter()
        .find(|gap| gap.key == "menaion.09_04.troparion" && gap.required_by == "vespers/apolytikia")
        .expect("troparion gap recorded");
    assert_eq!(gap.required_by, "vespers/apolytikia");

    let apolytikia = document.section("vespers").unwrap().slot("apolytikia").unwrap();
    assert!(apolytikia.has_placeholder());
    let placeholder = apolytikia
        .texts
        .iter()
        .find(|text| text.key == "menaion.09_04.troparion")
        .unwrap();
    assert_eq!(
        placeholder.record.body,
        "[MISSING_COMPONENT: menaion.09_04.troparion | REQUIRED_BY: vespers/apolytikia]"
    );
    assert!(document.render().contains("[MISSING_COMPONENT: menaion.09_04.troparion"));

    // texts that exist are still bound
    let opening = document.section("vespers").unwrap().slot("opening").unwrap();
    assert!(!opening.has_placeholder());
    assert_eq!(opening.texts[0].record.source, "Horologion");
}

#[test]
fn every_slot_of_pascha_is_bound() {
    let document = Typikon::builtin().unwrap().generate(ymd(2024, 3, 31)).unwrap().document;
    for section in &document.sections {
        assert!(section.template.is_some(), "{} not expanded", section.service);
        assert!(!section.slots.is_empty(), "{} has no slots", section.service);
    }
    assert!(document.is_complete(), "gaps: {:?}", document.gaps);
}

#[tokio::test]
async fn local_asset_layer_fills_gaps() {
    init_test_tracing();
    let config_dir = tempfile::tempdir().unwrap();
    std::fs::write(config_dir.path().join("rules.json"), RULES).unwrap();
    std::fs::write(config_dir.path().join("templates.json"), TEMPLATES).unwrap();
    std::fs::write(config_dir.path().join("daily_cycle.json"), DAILY_CYCLE).unwrap();

    let texts = tempfile::tempdir().unwrap();
    std::fs::create_dir(texts.path().join("menaion")).unwrap();
    std::fs::write(
        texts.path().join("menaion").join("september.json"),
        r#"{
            "menaion.09_04.troparion": {
                "title": "Troparion",
                "body": "Troparion of the Prophet Moses.",
                "source": "Menaion"
            },
            "menaion.09_04.kontakion": "Kontakion of the Prophet Moses.",
            "horologion.axion_estin": "It is truly meet (local recension)."
        }"#,
    )
    .unwrap();

    let engine = Typikon::load(config_dir.path(), &[texts.path()]).await.unwrap();
    assert_eq!(engine.assets().layers().len(), 2);

    let document = engine.generate(ymd(2024, 9, 4)).unwrap().document;
    assert!(document.gaps.iter().all(|gap| gap.key != "menaion.09_04.troparion"));
    let apolytikia = document.section("vespers").unwrap().slot("apolytikia").unwrap();
    let troparion = apolytikia
        .texts
        .iter()
        .find(|text| text.key == "menaion.09_04.troparion")
        .unwrap();
    assert_eq!(troparion.record.body, "Troparion of the Prophet Moses.");

    let magnification = document.section("liturgy").unwrap().slot("magnification").unwrap();
    assert_eq!(magnification.texts[0].record.body, "It is truly meet (local recension).");
}

#[test]
fn replacing_a_resolver() {
    let mut resolvers = ResolverRegistry::with_defaults();
    resolvers.register(ResolverId::Dismissal, |input: &ResolverInput<'_>| {
        ResolverOutput::default().line(format!("Dismissal for {}", input.context.date()))
    });
    let engine = Typikon::builtin().unwrap().with_resolvers(resolvers);

    let document = engine.generate(ymd(2024, 9, 4)).unwrap().document;
    let dismissal = document.section("liturgy").unwrap().slot("dismissal").unwrap();
    assert_eq!(dismissal.lines, vec!["Dismissal for 2024-09-04".to_string()]);
}

#[test]
fn unregistered_resolver_is_a_gap() {
    let engine = Typikon::builtin().unwrap().with_resolvers(ResolverRegistry::new());
    let document = engine.generate(ymd(2024, 9, 4)).unwrap().document;
    assert!(document
        .gaps
        .iter()
        .any(|gap| gap.key == "logic.dismissal" && gap.required_by == "liturgy/dismissal"));
}

#[test]
fn document_json_round_trip() {
    let document = Typikon::builtin().unwrap().generate(ymd(2024, 8, 15)).unwrap().document;
    let json = document.to_json().unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(back, document);
    assert!(json.contains("\"date\": \"2024-08-15\""));
}

#[test]
fn sunday_stichera_follow_general_case() {
    // ordinary Sunday with no fixed-date entry: one generic saint
    let generation = Typikon::builtin().unwrap().generate(ymd(2024, 9, 22)).unwrap();
    let case = generation.rubrics.case.as_ref().unwrap();
    assert_eq!(case.case_id, "case_01");

    let stichera = generation.document.section("vespers").unwrap().slot("stichera").unwrap();
    assert_eq!(
        stichera.lines[0],
        "On 10: 7 from octoechos.resurrection, 3 from menaion.saint"
    );
}
