//! End-to-end resolution of days where the movable and fixed cycles meet

use pretty_assertions::assert_eq;
use typikon_core::prelude::*;
use typikon_core::MERGE_NOTE;
use typikon_rules::{CollisionAction, Paradigm, ScenarioSource};
use typikon_test_utils::{init_test_tracing, ymd};

fn engine() -> Typikon {
    init_test_tracing();
    Typikon::builtin().unwrap()
}

#[test]
fn pascha_2024() {
    let (context, rubrics, document) = engine().generate(ymd(2024, 3, 31)).unwrap().into_parts();

    assert_eq!(context.day_offset_from_anchor(), 0);
    assert_eq!(rubrics.scenario.id.as_str(), "movable_pascha");
    assert_eq!(rubrics.title, "Holy Pascha: The Resurrection of Our Lord");
    assert_eq!(document.title, rubrics.title);

    let liturgy = document.section("liturgy").unwrap();
    let troparia = liturgy.slot("troparia").unwrap();
    assert_eq!(troparia.texts[0].key, "pentecostarion_day_0.troparion");
    assert!(!troparia.has_placeholder());
}

#[test]
fn kyriopascha_merges_annunciation() {
    // Pascha 2035 falls on March 25
    let generation = engine().generate(ymd(2035, 3, 25)).unwrap();
    let rubrics = &generation.rubrics;

    assert_eq!(generation.context.day_offset_from_anchor(), 0);
    assert_eq!(rubrics.scenario.source, ScenarioSource::Collision);
    assert_eq!(rubrics.scenario.id.as_str(), "kyriopascha");
    assert_eq!(
        rubrics.scenario.collision.as_ref().map(|c| c.action),
        Some(CollisionAction::Merge)
    );
    assert!(rubrics.title.starts_with("Kyriopascha"));
    assert_eq!(rubrics.commemorations.len(), 1);
    assert_eq!(rubrics.paradigm, Paradigm::FeastOfTheLord);
}

#[test]
fn st_george_on_holy_friday_is_transferred() {
    // Pascha 2038 falls on April 25, so April 23 is Great and Holy Friday
    let generation = engine().generate(ymd(2038, 4, 23)).unwrap();
    let rubrics = &generation.rubrics;

    assert_eq!(generation.context.day_offset_from_anchor(), -2);
    assert_eq!(rubrics.scenario.id.as_str(), "st_george_transferred");
    assert_eq!(rubrics.title, "Great and Holy Friday");
    assert!(rubrics.commemorations.is_empty());

    let document = &generation.document;
    assert_eq!(
        document.section("hours").unwrap().template.as_deref(),
        Some("hours_royal")
    );
    assert_eq!(
        document.section("liturgy").unwrap().template.as_deref(),
        Some("liturgy_none")
    );
    let dismissal = document.section("matins").unwrap().slot("dismissal").unwrap();
    assert!(dismissal.lines.iter().all(|line| !line.contains("George")));
}

#[test]
fn st_george_outside_holy_week_is_kept() {
    let rubrics = engine().generate(ymd(2024, 4, 23)).unwrap().rubrics;
    assert_eq!(rubrics.scenario.source, ScenarioSource::Ordinary);
    assert_eq!(rubrics.title, "Holy Great-martyr George");
    assert_eq!(rubrics.commemorations.len(), 1);
}

#[test]
fn annunciation_in_holy_week_takes_the_title() {
    // Monday of Holy Week 2024
    let rubrics = engine().generate(ymd(2024, 3, 25)).unwrap().rubrics;
    assert_eq!(rubrics.title, "The Annunciation of the Theotokos");
    assert_eq!(rubrics.paradigm, Paradigm::FeastOfTheLord);
}

#[test]
fn nativity_eve_depends_on_weekday() {
    let engine = engine();

    // Wednesday: vespers is folded into the liturgy of St. Basil
    let weekday = engine.generate(ymd(2025, 12, 24)).unwrap().document;
    let vespers = weekday.section("vespers").unwrap();
    assert_eq!(vespers.note.as_deref(), Some(MERGE_NOTE));
    assert_eq!(vespers.template, None);
    assert_eq!(
        weekday.section("liturgy").unwrap().template.as_deref(),
        Some("liturgy_basil")
    );
    assert!(weekday.render().contains(MERGE_NOTE));

    // Sunday: vespers is served on its own, liturgy of St. John Chrysostom
    let sunday = engine.generate(ymd(2023, 12, 24)).unwrap();
    assert!(!sunday.rubrics.evening_office_merged());
    let vespers = sunday.document.section("vespers").unwrap();
    assert!(vespers.template.is_some());
    assert_eq!(
        sunday.document.section("liturgy").unwrap().template.as_deref(),
        Some("liturgy_chrysostom")
    );
    assert_eq!(
        sunday.document.section("hours").unwrap().template.as_deref(),
        Some("hours_royal")
    );
}

#[test]
fn lenten_wednesday() {
    let generation = engine().generate(ymd(2024, 2, 21)).unwrap();
    let document = &generation.document;

    assert_eq!(
        document.section("liturgy").unwrap().template.as_deref(),
        Some("liturgy_presanctified")
    );
    assert_eq!(
        document.section("hours").unwrap().template.as_deref(),
        Some("hours_lenten")
    );

    let vespers = document.section("vespers").unwrap();
    assert_eq!(vespers.template.as_deref(), Some("vespers_lenten"));
    assert!(vespers.slot("entrance").is_none());
    assert!(vespers.slot("prayer_of_ephrem").is_some());

    let matins = document.section("matins").unwrap();
    let canon = matins.slot("canon").unwrap();
    assert_eq!(canon.lines, vec!["Odes of the Triodion: 3, 8, 9".to_string()]);
    let alleluia = matins.slot("god_is_the_lord").unwrap();
    assert!(alleluia.lines[0].starts_with("Alleluia"), "{:?}", alleluia.lines);
    assert_eq!(alleluia.texts[0].key, "matins.alleluia_verses");

    let third_hour = document.section("hours").unwrap().slot("third_hour_troparia").unwrap();
    assert_eq!(third_hour.texts[0].key, "hours.lenten_troparia");
}

#[test]
fn festal_saturday_takes_the_theotokion_of_the_coming_tone() {
    // St. Nicholas falls on a Saturday in 2025
    let engine = engine();
    let generation = engine.generate(ymd(2025, 12, 6)).unwrap();
    let sunday = engine.context(ymd(2025, 12, 7)).unwrap();
    let expected = format!("tone_{}.theotokion_dogmatikon", sunday.tone());

    assert_eq!(
        generation.rubrics.variable(typikon_core::MATINS_THEOTOKION),
        Some(expected.as_str())
    );
    let theotokion = generation
        .document
        .section("matins")
        .unwrap()
        .slot("theotokion")
        .unwrap();
    assert_eq!(theotokion.texts[0].key, expected);
    assert!(!theotokion.has_placeholder());
}

#[test]
fn paschal_liturgy_sings_as_many_as_have_been_baptized() {
    let document = engine().generate(ymd(2024, 3, 31)).unwrap().document;
    let liturgy = document.section("liturgy").unwrap();
    assert_eq!(
        liturgy.slot("trisagion_hymn").unwrap().texts[0].key,
        "liturgy.trisagion_baptismal"
    );
    assert_eq!(
        liturgy.slot("cherubic_hymn").unwrap().texts[0].key,
        "liturgy.cherubic_hymn"
    );
}

#[test]
fn bright_week_uses_paschal_forms() {
    // Tuesday of Bright Week 2024
    let generation = engine().generate(ymd(2024, 4, 2)).unwrap();
    let document = &generation.document;

    assert_eq!(
        document.section("hours").unwrap().template.as_deref(),
        Some("hours_paschal")
    );
    assert_eq!(
        document.section("matins").unwrap().template.as_deref(),
        Some("matins_bright")
    );
    let dismissal = document.section("liturgy").unwrap().slot("dismissal").unwrap();
    assert_eq!(dismissal.lines[0], "May Christ our true God, risen from the dead,");
}

#[test]
fn patronal_feast_is_a_local_scenario() {
    let engine = engine().with_options(
        EngineOptions::new()
            .with_local_commemoration(MonthDay::new(12, 6).unwrap())
            .with_temple("St. Nicholas", TempleType::Saint),
    );
    // Friday
    let rubrics = engine.generate(ymd(2024, 12, 6)).unwrap().rubrics;
    assert_eq!(rubrics.scenario.source, ScenarioSource::Local);
    assert_eq!(rubrics.scenario.id.as_str(), "patronal_feast");
    assert_eq!(rubrics.title, "PATRONAL FEAST: St. Nicholas the Wonderworker");

    // Sunday
    let rubrics = engine.generate(ymd(2026, 12, 6)).unwrap().rubrics;
    assert_eq!(rubrics.scenario.id.as_str(), "patronal_feast_on_sunday");
}

#[test]
fn floating_sunday_before_nativity() {
    // 2024-12-22 is the Sunday in the 18-24 December range
    let rubrics = engine().generate(ymd(2024, 12, 22)).unwrap().rubrics;
    assert!(rubrics.title.contains("Sunday before the Nativity"));
}

#[test]
fn epoch_bounds() {
    let engine = engine();
    for date in [ymd(1500, 1, 1), ymd(1583, 1, 1), ymd(4100, 1, 1)] {
        let err = engine.generate(date).unwrap_err();
        assert!(err.is_date_error(), "{date}: {err}");
    }
    assert!(engine.generate(ymd(1584, 6, 1)).is_ok());
    assert!(engine.generate(ymd(4099, 6, 1)).is_ok());
}

#[test]
fn anchor_day_is_the_top_season() -> anyhow::Result<()> {
    let engine = engine();
    for year in [2024, 2025, 2035, 2038] {
        let pascha = typikon_calendar::anchor_date(year)?;
        let generation = engine.generate(pascha)?;
        assert_eq!(
            generation.context.season(),
            typikon_calendar::Season::FeastOfTheAnchor
        );
        assert!(generation.document.title.contains("Pascha"), "{year}");
    }
    Ok(())
}
