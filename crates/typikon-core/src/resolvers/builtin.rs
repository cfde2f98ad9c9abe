//! Built-in resolver implementations
//!
//! Each function turns the day's context and rubrics into literal lines and
//! asset keys. Keys follow the store's naming: `menaion.MM_DD.*` for the
//! fixed cycle, `<book>_day_<offset>.*` for movable propers, `tone_N.*` for
//! the octoechos and `horologion.*` / `liturgy.*` for the ordinary.

use tracing::debug;
use typikon_assets::UnresolvedReference;
use typikon_calendar::{MonthDay, Period, Season, SATURDAY};
use typikon_rules::{
    fill_to_count, Allocation, DistributionSpec, Paradigm, ScenarioSource, VariableInputs,
    VariableMap,
};

use super::{ResolverInput, ResolverOutput};
use crate::config::TempleType;
use crate::rubrics::festal_tier;

const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Stichera total when no general case covers the stack
const DEFAULT_STICHERA_TOTAL: u32 = 6;

const ISODIKON_VERSE: &str = "Come, let us worship and bow down before Christ.";
const ISODIKON_SUNDAY: &str =
    "O Son of God, risen from the dead, save us who sing to You: Alleluia.";
const ISODIKON_WEEKDAY: &str =
    "O Son of God, wondrous in the saints, save us who sing to You: Alleluia.";

const DISMISSAL_RISEN: &str = "May Christ our true God, risen from the dead,";
const DISMISSAL_PLAIN: &str = "May Christ our true God,";
const DISMISSAL_THEOTOKOS: &str = "through the prayers of His most pure Mother;";
const DISMISSAL_CLOSE: &str =
    "and of all the saints, have mercy on us and save us, for He is good and loves mankind.";

/// Odes of the triodion canon on lenten weekdays, by weekday index
const LENTEN_ODES: [&[u8]; 7] = [
    &[],
    &[1, 8, 9],
    &[2, 8, 9],
    &[3, 8, 9],
    &[4, 8, 9],
    &[5, 8, 9],
    &[6, 7, 8, 9],
];

/// Last offset on which the paschal katavasia is sung (leave-taking of Pascha)
const PASCHAL_KATAVASIA_END: i64 = 38;

const LAZARUS_SATURDAY: i64 = -8;
const CROSS_VENERATION_SUNDAY: i64 = -28;
const HOLY_THURSDAY: i64 = -3;
const ASCENSION_OFFSET: i64 = 39;

fn weekday_name(input: &ResolverInput<'_>) -> &'static str {
    WEEKDAY_NAMES
        .get(usize::from(input.context.weekday_index()))
        .copied()
        .unwrap_or("sunday")
}

fn menaion_key(month_day: MonthDay, suffix: &str) -> String {
    format!("menaion.{:02}_{:02}.{suffix}", month_day.month(), month_day.day())
}

/// Proper of the occasion: movable days read their seasonal book, all
/// others the fixed-date calendar.
fn proper_key(input: &ResolverInput<'_>, suffix: &str) -> String {
    let movable = matches!(
        input.rubrics.scenario.source,
        ScenarioSource::Movable | ScenarioSource::Collision
    );
    match input.context.season_day_key() {
        Some(day) if movable => format!("{day}.{suffix}"),
        _ => menaion_key(input.context.month_day(), suffix),
    }
}

/// Variable map for the slot, using the coming Sunday's tone at a vigil
fn variable_map(input: &ResolverInput<'_>) -> VariableMap {
    let mut inputs = VariableInputs::from_context(input.context);
    if let Some(tone) = input.rubrics.next_day_tone {
        inputs = inputs.with_tone(tone);
    }
    VariableMap::build(&inputs)
}

fn tone(input: &ResolverInput<'_>) -> u8 {
    input
        .rubrics
        .next_day_tone
        .unwrap_or_else(|| input.context.tone())
}

fn is_resurrectional(input: &ResolverInput<'_>) -> bool {
    input.context.is_sunday() || input.context.period() == Period::BrightWeek
}

pub(super) fn variable_reference(input: &ResolverInput<'_>) -> ResolverOutput {
    let Some(token) = input.arg_str("token") else {
        return ResolverOutput::default().unresolved(UnresolvedReference::new(
            "variable_reference.token",
            input.required_by,
        ));
    };
    // a rubric layer may bind the token for this day
    if let Some(key) = input.rubrics.variable(token) {
        return ResolverOutput::default().reference(key);
    }
    match variable_map(input).resolve(token) {
        Some(key) => ResolverOutput::default().reference(key),
        None => match input.arg_str("fallback") {
            Some(fallback) => ResolverOutput::default().reference(fallback),
            None => {
                debug!(token, required_by = input.required_by, "unmapped symbolic reference");
                ResolverOutput::default()
                    .unresolved(UnresolvedReference::new(token, input.required_by))
            }
        },
    }
}

pub(super) fn stichera_distribution(input: &ResolverInput<'_>) -> ResolverOutput {
    let stack = input.arg_str("stack").unwrap_or("vespers");
    let spec = input
        .rubrics
        .case
        .as_ref()
        .and_then(|case| case.stack(stack))
        .cloned()
        .unwrap_or_else(|| {
            let half = DEFAULT_STICHERA_TOTAL / 2;
            DistributionSpec::new(
                DEFAULT_STICHERA_TOTAL,
                vec![
                    Allocation::new("octoechos", None, half),
                    Allocation::new("menaion", None, DEFAULT_STICHERA_TOTAL - half),
                ],
            )
        });

    let summary: Vec<String> = spec
        .distribution
        .iter()
        .map(|a| format!("{} from {}", a.quantity, a.label()))
        .collect();
    let mut output = ResolverOutput::default().line(format!(
        "On {}: {}",
        spec.total,
        summary.join(", ")
    ));

    // hymn lists are given per allocation label or per source; tokens are
    // mapped, anything else is taken as an asset key
    let map = variable_map(input);
    for allocation in &spec.distribution {
        let mut hymns = input.arg_strings(&allocation.label());
        if hymns.is_empty() {
            hymns = input.arg_strings(&allocation.source);
        }
        let keys: Vec<String> = hymns
            .iter()
            .map(|hymn| map.resolve(hymn).map_or_else(|| hymn.clone(), str::to_string))
            .collect();
        output
            .refs
            .extend(fill_to_count(&keys, allocation.quantity as usize));
    }
    output
}

pub(super) fn troparia_stack(input: &ResolverInput<'_>) -> ResolverOutput {
    let rubrics = input.rubrics;
    let month_day = input.context.month_day();
    let has_saint = !rubrics.commemorations.is_empty();
    let temple = !rubrics.temple_patron_suppressed();
    let theotokos_temple = input.options.temple_type == TempleType::Theotokos;
    let mut output = ResolverOutput::default();

    match rubrics.paradigm {
        Paradigm::FeastOfTheLord => {
            output = output
                .reference(proper_key(input, "troparion"))
                .reference(proper_key(input, "kontakion"));
        }
        Paradigm::SundayResurrection => {
            let map = variable_map(input);
            let tone = tone(input);
            match map.resolve("troparion_resurrection") {
                Some(key) => output.refs.push(key.to_string()),
                None => output = output.unresolved(UnresolvedReference::new(
                    "troparion_resurrection",
                    input.required_by,
                )),
            }
            if temple && theotokos_temple {
                output.refs.push("temple.troparion".to_string());
            }
            if has_saint {
                output.refs.push(menaion_key(month_day, "troparion"));
            }
            if temple && !theotokos_temple {
                output.refs.push("temple.troparion".to_string());
            }
            output.refs.push(format!("tone_{tone}.sun_liturgy.kontakion"));
            if has_saint {
                output.refs.push(menaion_key(month_day, "kontakion"));
            }
            if temple && theotokos_temple {
                output.refs.push("temple.kontakion".to_string());
            } else {
                output.refs.push("horologion.kontakion_protection".to_string());
            }
        }
        Paradigm::OrdinaryWeekday => {
            let weekday = weekday_name(input);
            output.refs.push(format!("weekday.{weekday}.troparion"));
            if has_saint {
                output.refs.push(menaion_key(month_day, "troparion"));
            }
            if temple {
                output.refs.push("temple.troparion".to_string());
            }
            output.refs.push(format!("weekday.{weekday}.kontakion"));
            if has_saint {
                output.refs.push(menaion_key(month_day, "kontakion"));
            }
            if temple {
                output.refs.push("temple.kontakion".to_string());
            }
            output.refs.push("horologion.kontakion_protection".to_string());
        }
    }
    output
}

pub(super) fn isodikon(input: &ResolverInput<'_>) -> ResolverOutput {
    match input.rubrics.paradigm {
        Paradigm::FeastOfTheLord => {
            ResolverOutput::default().reference(proper_key(input, "isodikon"))
        }
        Paradigm::SundayResurrection => {
            ResolverOutput::default().line(format!("{ISODIKON_VERSE} {ISODIKON_SUNDAY}"))
        }
        Paradigm::OrdinaryWeekday if is_resurrectional(input) => {
            ResolverOutput::default().line(format!("{ISODIKON_VERSE} {ISODIKON_SUNDAY}"))
        }
        Paradigm::OrdinaryWeekday => {
            ResolverOutput::default().line(format!("{ISODIKON_VERSE} {ISODIKON_WEEKDAY}"))
        }
    }
}

pub(super) fn dismissal(input: &ResolverInput<'_>) -> ResolverOutput {
    let preamble = if is_resurrectional(input) {
        DISMISSAL_RISEN
    } else {
        DISMISSAL_PLAIN
    };
    let mut output = ResolverOutput::default()
        .line(preamble)
        .line(DISMISSAL_THEOTOKOS);

    for commemoration in &input.rubrics.commemorations {
        output.lines.push(format!("of {};", commemoration.name));
    }
    if input.rubrics.temple_patron_suppressed() {
        debug!(date = %input.context.date(), "temple patron omitted from dismissal");
    } else {
        output.lines.push(format!(
            "of {}, patron of this holy temple;",
            input.options.temple_patron
        ));
    }
    output.line(DISMISSAL_CLOSE)
}

pub(super) fn antiphons(input: &ResolverInput<'_>) -> ResolverOutput {
    let rubrics = input.rubrics;
    let kind = if rubrics.paradigm == Paradigm::FeastOfTheLord {
        "festal"
    } else if input.context.is_sunday() || rubrics.rank.at_least(festal_tier()) {
        "typical"
    } else {
        "daily"
    };
    ResolverOutput::default().reference(format!("liturgy.antiphons_{kind}"))
}

pub(super) fn magnification(input: &ResolverInput<'_>) -> ResolverOutput {
    if input.rubrics.paradigm == Paradigm::FeastOfTheLord {
        return ResolverOutput::default().reference(proper_key(input, "zadostoinyk"));
    }
    let liturgy = input
        .arg_str("liturgy")
        .or_else(|| input.rubrics.variable("liturgy"));
    let key = if liturgy == Some("basil") {
        "horologion.in_thee_rejoiceth"
    } else {
        "horologion.axion_estin"
    };
    ResolverOutput::default().reference(key)
}

pub(super) fn vespers_kathisma(input: &ResolverInput<'_>) -> ResolverOutput {
    let context = input.context;
    if context.is_sunday() || context.period() == Period::BrightWeek {
        ResolverOutput::default().line("No kathisma is read.")
    } else if context.weekday_index() == SATURDAY || input.rubrics.rank.at_least(festal_tier()) {
        ResolverOutput::default()
            .line("First antiphon of the first kathisma.")
            .reference("psalter.kathisma_1_antiphon_1")
    } else {
        ResolverOutput::default().reference("psalter.kathisma_18")
    }
}

pub(super) fn vespers_entrance(input: &ResolverInput<'_>) -> ResolverOutput {
    if input.rubrics.is_festal() {
        ResolverOutput::default().line("Entrance with the censer.")
    } else {
        ResolverOutput::default().line("No entrance.")
    }
}

pub(super) fn doxology_mode(input: &ResolverInput<'_>) -> ResolverOutput {
    if input.rubrics.rank.at_least(festal_tier()) || input.context.is_sunday() {
        ResolverOutput::default()
            .line("The Great Doxology is sung.")
            .reference("matins.great_doxology")
    } else {
        ResolverOutput::default()
            .line("The Doxology is read.")
            .reference("matins.daily_doxology")
    }
}

pub(super) fn katavasia(input: &ResolverInput<'_>) -> ResolverOutput {
    let context = input.context;
    let month_day = context.month_day();
    let offset = context.day_offset_from_anchor();

    let name = if matches!(context.season(), Season::FeastOfTheAnchor | Season::PostFestal)
        && offset <= PASCHAL_KATAVASIA_END
    {
        "paschal_canon"
    } else if within(month_day, (8, 1), (9, 14)) {
        "cross_of_moses"
    } else if within(month_day, (11, 21), (12, 31)) {
        "christ_is_born"
    } else {
        "i_shall_open"
    };
    ResolverOutput::default().reference(format!("katavasia.{name}"))
}

fn within(month_day: MonthDay, from: (u32, u32), to: (u32, u32)) -> bool {
    match (MonthDay::new(from.0, from.1), MonthDay::new(to.0, to.1)) {
        (Ok(from), Ok(to)) => month_day.within(from, to),
        _ => false,
    }
}

pub(super) fn communion_hymn(input: &ResolverInput<'_>) -> ResolverOutput {
    let key = if input.rubrics.paradigm == Paradigm::FeastOfTheLord {
        proper_key(input, "koinonikon")
    } else {
        format!("horologion.koinonikon_{}", weekday_name(input))
    };
    ResolverOutput::default().reference(key)
}

pub(super) fn canon_odes(input: &ResolverInput<'_>) -> ResolverOutput {
    let context = input.context;
    let odes = LENTEN_ODES
        .get(usize::from(context.weekday_index()))
        .copied()
        .unwrap_or_default();

    match context.season_day_key() {
        Some(day) if context.period() == Period::LentWeekday && !odes.is_empty() => {
            let list: Vec<String> = odes.iter().map(u8::to_string).collect();
            let mut output = ResolverOutput::default()
                .line(format!("Odes of the Triodion: {}", list.join(", ")));
            output
                .refs
                .extend(odes.iter().map(|ode| format!("{day}.canon_ode_{ode}")));
            output
        }
        _ => ResolverOutput::default()
            .line("Canon of the Menaion.")
            .reference(menaion_key(context.month_day(), "canon")),
    }
}

pub(super) fn eothinon(input: &ResolverInput<'_>) -> ResolverOutput {
    let token = match input.arg_str("part").unwrap_or("gospel") {
        "stichera" => "eothinon_hymn",
        "exapostilarion" => "exapostilarion_resurrection",
        _ => "eothinon_gospel",
    };
    match variable_map(input).resolve(token) {
        Some(key) => ResolverOutput::default()
            .line(format!("Resurrectional gospel {}.", input.context.eothinon()))
            .reference(key),
        None => ResolverOutput::default()
            .unresolved(UnresolvedReference::new(token, input.required_by)),
    }
}

/// Lenten weekday office: Alleluia at matins, lenten hours
///
/// A commemoration of polyeleos class or higher keeps the ordinary forms.
fn is_lenten_office(input: &ResolverInput<'_>) -> bool {
    let context = input.context;
    let lenten = match context.period() {
        Period::LentWeekday => (1..=5).contains(&context.weekday_index()),
        Period::HolyFriday => true,
        _ => false,
    };
    lenten
        && !input
            .rubrics
            .commemorations
            .iter()
            .any(|commemoration| commemoration.rank().at_least(festal_tier()))
}

fn hour_name(hour: u64) -> &'static str {
    match hour {
        3 => "Third",
        6 => "Sixth",
        9 => "Ninth",
        _ => "First",
    }
}

pub(super) fn god_is_the_lord(input: &ResolverInput<'_>) -> ResolverOutput {
    let tone = tone(input);
    if is_lenten_office(input) {
        ResolverOutput::default()
            .line(format!("Alleluia, in tone {tone}, with the verses."))
            .reference("matins.alleluia_verses")
            .reference(format!("tone_{tone}.trinity_hymns"))
    } else {
        ResolverOutput::default()
            .line(format!("God is the Lord, in tone {tone}."))
            .reference("matins.god_is_the_lord")
    }
}

/// Days whose trisagion hymn is "As many as have been baptized"
fn is_baptismal_day(input: &ResolverInput<'_>) -> bool {
    let context = input.context;
    let fixed = [(12, 25), (1, 6)]
        .iter()
        .any(|&(month, day)| context.month() == month && context.day() == day);
    fixed
        || matches!(
            context.period(),
            Period::Pascha | Period::BrightWeek | Period::HolySaturday | Period::Pentecost
        )
        || context.day_offset_from_anchor() == LAZARUS_SATURDAY
}

/// Days whose trisagion hymn is "Before Your Cross"
fn is_cross_day(input: &ResolverInput<'_>) -> bool {
    let context = input.context;
    (context.month() == 9 && context.day() == 14)
        || context.day_offset_from_anchor() == CROSS_VENERATION_SUNDAY
}

pub(super) fn trisagion(input: &ResolverInput<'_>) -> ResolverOutput {
    if input.arg_str("form") == Some("hymn") {
        let key = if is_baptismal_day(input) {
            "liturgy.trisagion_baptismal"
        } else if is_cross_day(input) {
            "liturgy.trisagion_cross"
        } else {
            "liturgy.trisagion_hymn"
        };
        return ResolverOutput::default().reference(key);
    }

    let offset = input.context.day_offset_from_anchor();
    if (0..ASCENSION_OFFSET).contains(&offset) {
        ResolverOutput::default()
            .line("Christ is risen, thrice, in place of the Trisagion prayers.")
            .reference("pentecostarion_day_0.troparion")
            .reference("horologion.our_father")
    } else {
        ResolverOutput::default()
            .reference("horologion.trisagion")
            .reference("horologion.our_father")
    }
}

pub(super) fn hours_troparia(input: &ResolverInput<'_>) -> ResolverOutput {
    let hour = input.arg_u64("hour").unwrap_or(1);
    if is_lenten_office(input) {
        return ResolverOutput::default()
            .line(format!("Lenten troparia of the {} Hour.", hour_name(hour)))
            .reference("hours.lenten_troparia");
    }

    let rubrics = input.rubrics;
    let month_day = input.context.month_day();
    let has_saint = !rubrics.commemorations.is_empty();
    let mut output = ResolverOutput::default();
    match rubrics.paradigm {
        Paradigm::FeastOfTheLord => output.refs.push(proper_key(input, "troparion")),
        Paradigm::SundayResurrection => {
            match variable_map(input).resolve("troparion_resurrection") {
                Some(key) => output.refs.push(key.to_string()),
                None => {
                    output = output.unresolved(UnresolvedReference::new(
                        "troparion_resurrection",
                        input.required_by,
                    ));
                }
            }
            if has_saint {
                output.lines.push("Glory..., troparion of the saint.".to_string());
                output.refs.push(menaion_key(month_day, "troparion"));
            }
        }
        Paradigm::OrdinaryWeekday if has_saint => {
            output.refs.push(menaion_key(month_day, "troparion"));
        }
        Paradigm::OrdinaryWeekday => {
            output
                .refs
                .push(format!("weekday.{}.troparion", weekday_name(input)));
        }
    }
    output
}

pub(super) fn hours_kontakion(input: &ResolverInput<'_>) -> ResolverOutput {
    if is_lenten_office(input) {
        return ResolverOutput::default().line("Lord, have mercy (40 times).");
    }

    let hour = input.arg_u64("hour").unwrap_or(1);
    let rubrics = input.rubrics;
    let has_saint = !rubrics.commemorations.is_empty();
    let saint = menaion_key(input.context.month_day(), "kontakion");
    let resurrection = format!("tone_{}.sun_liturgy.kontakion", tone(input));
    let key = match rubrics.paradigm {
        Paradigm::FeastOfTheLord => proper_key(input, "kontakion"),
        // the resurrection and the saint alternate through the hours
        Paradigm::SundayResurrection if has_saint => {
            if matches!(hour, 1 | 6) {
                resurrection
            } else {
                saint
            }
        }
        Paradigm::SundayResurrection => resurrection,
        Paradigm::OrdinaryWeekday if has_saint => saint,
        Paradigm::OrdinaryWeekday => format!("weekday.{}.kontakion", weekday_name(input)),
    };
    ResolverOutput::default().reference(key)
}

pub(super) fn cherubic_hymn(input: &ResolverInput<'_>) -> ResolverOutput {
    let context = input.context;
    let key = if context.day_offset_from_anchor() == HOLY_THURSDAY {
        "liturgy.cherubic_mystical_supper"
    } else if context.period() == Period::HolySaturday {
        "liturgy.cherubic_let_all_mortal_flesh"
    } else {
        "liturgy.cherubic_hymn"
    };
    ResolverOutput::default().reference(key)
}

#[cfg(test)]
mod tests {
    use super::super::ResolverRegistry;
    use super::*;
    use crate::config::EngineOptions;
    use crate::rubrics::ResolvedRubrics;
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use typikon_calendar::{Context, ContextBuilder};
    use typikon_rules::{
        classify_paradigm, CaseResolution, Commemoration, CommemorationKind, Rank, ScenarioMatch,
    };
    use typikon_structure::{LogicArgs, ResolverId};

    fn ctx(year: i32, month: u32, day: u32) -> Context {
        ContextBuilder::new()
            .build(NaiveDate::from_ymd_opt(year, month, day).unwrap())
            .unwrap()
    }

    fn rubrics(context: &Context, rank: Rank, saints: &[&str]) -> ResolvedRubrics {
        ResolvedRubrics {
            title: "test".into(),
            scenario: ScenarioMatch::ordinary(),
            rank,
            paradigm: classify_paradigm(context, rank),
            active_key: None,
            commemorations: saints
                .iter()
                .map(|name| Commemoration::new(*name, CommemorationKind::Simple))
                .collect(),
            case: None,
            variables: IndexMap::new(),
            overrides: IndexMap::new(),
            is_sunday_vigil: false,
            next_day_tone: None,
        }
    }

    fn run(
        id: ResolverId,
        context: &Context,
        rubrics: &ResolvedRubrics,
        args: &LogicArgs,
        options: &EngineOptions,
    ) -> ResolverOutput {
        let input = ResolverInput {
            context,
            rubrics,
            args,
            options,
            required_by: "test/slot",
        };
        ResolverRegistry::with_defaults().resolve(id, &input)
    }

    fn args(value: serde_json::Value) -> LogicArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn variable_reference_uses_vigil_tone() {
        let saturday = ctx(2024, 6, 1);
        let mut r = rubrics(&saturday, Rank::DEFAULT, &[]);
        r.is_sunday_vigil = true;
        r.next_day_tone = Some(6);
        let out = run(
            ResolverId::VariableReference,
            &saturday,
            &r,
            &args(json!({"token": "troparion_resurrection"})),
            &EngineOptions::default(),
        );
        assert_eq!(out.refs, vec!["tone_6.sat_vespers.troparia"]);
    }

    #[test]
    fn unmapped_token_is_reported_not_fatal() {
        let day = ctx(2024, 9, 3);
        let r = rubrics(&day, Rank::LOWEST, &[]);
        let out = run(
            ResolverId::VariableReference,
            &day,
            &r,
            &args(json!({"token": "canon_triodion"})),
            &EngineOptions::default(),
        );
        assert!(out.refs.is_empty());
        assert_eq!(out.unresolved[0].key, "canon_triodion");
        assert_eq!(out.unresolved[0].required_by, "test/slot");

        let out = run(
            ResolverId::VariableReference,
            &day,
            &r,
            &args(json!({"token": "canon_triodion", "fallback": "menaion.09_03.canon"})),
            &EngineOptions::default(),
        );
        assert_eq!(out.refs, vec!["menaion.09_03.canon"]);
    }

    #[test]
    fn stichera_follow_case_distribution() {
        let day = ctx(2024, 6, 2);
        let mut r = rubrics(&day, Rank::DEFAULT, &["St. Nicephorus"]);
        r.case = Some(CaseResolution {
            case_id: "case_01".into(),
            stacks: [(
                "vespers".to_string(),
                DistributionSpec::new(
                    10,
                    vec![
                        Allocation::new("octoechos", Some("resurrection"), 7),
                        Allocation::new("menaion", Some("saint"), 3),
                    ],
                ),
            )]
            .into_iter()
            .collect(),
        });
        let out = run(
            ResolverId::SticheraDistribution,
            &day,
            &r,
            &args(json!({
                "stack": "vespers",
                "octoechos": ["stichera_resurrection"],
                "menaion.saint": ["menaion.06_02.sticheron_1", "menaion.06_02.sticheron_2"]
            })),
            &EngineOptions::default(),
        );
        assert_eq!(out.lines, vec!["On 10: 7 from octoechos.resurrection, 3 from menaion.saint"]);
        assert_eq!(out.refs.len(), 10);
        assert_eq!(out.refs[6], format!("tone_{}.sat_vespers.stichera_lord_i_call", day.tone()));
        assert_eq!(
            &out.refs[7..],
            &[
                "menaion.06_02.sticheron_1",
                "menaion.06_02.sticheron_1",
                "menaion.06_02.sticheron_2"
            ]
        );
    }

    #[test]
    fn stichera_default_split_without_case() {
        let day = ctx(2024, 9, 3);
        let r = rubrics(&day, Rank::LOWEST, &[]);
        let out = run(
            ResolverId::SticheraDistribution,
            &day,
            &r,
            &LogicArgs::new(),
            &EngineOptions::default(),
        );
        assert_eq!(out.lines, vec!["On 6: 3 from octoechos, 3 from menaion"]);
        assert!(out.refs.is_empty());
    }

    #[test]
    fn sunday_troparia_put_theotokos_temple_first() {
        let sunday = ctx(2024, 6, 2);
        let r = rubrics(&sunday, Rank::DEFAULT, &["St. Nicephorus"]);
        let options = EngineOptions::new().with_temple("the Dormition", TempleType::Theotokos);
        let out = run(ResolverId::TropariaStack, &sunday, &r, &LogicArgs::new(), &options);
        let tone = sunday.tone();
        assert_eq!(
            out.refs,
            vec![
                format!("tone_{tone}.sat_vespers.troparia"),
                "temple.troparion".to_string(),
                "menaion.06_02.troparion".to_string(),
                format!("tone_{tone}.sun_liturgy.kontakion"),
                "menaion.06_02.kontakion".to_string(),
                "temple.kontakion".to_string(),
            ]
        );
    }

    #[test]
    fn feast_of_the_lord_drops_temple_and_resurrection() {
        // Transfiguration on a Tuesday
        let day = ctx(2024, 8, 6);
        let r = rubrics(&day, Rank::HIGHEST, &["Transfiguration"]);
        let options = EngineOptions::default();
        let out = run(ResolverId::TropariaStack, &day, &r, &LogicArgs::new(), &options);
        assert_eq!(out.refs, vec!["menaion.08_06.troparion", "menaion.08_06.kontakion"]);

        let out = run(ResolverId::Dismissal, &day, &r, &LogicArgs::new(), &options);
        assert_eq!(out.lines[0], DISMISSAL_PLAIN);
        assert!(out.lines.iter().any(|l| l == "of Transfiguration;"));
        assert!(!out.lines.iter().any(|l| l.contains("patron of this holy temple")));

        let out = run(ResolverId::Magnification, &day, &r, &LogicArgs::new(), &options);
        assert_eq!(out.refs, vec!["menaion.08_06.zadostoinyk"]);
    }

    #[test]
    fn sunday_dismissal_names_patron() {
        let sunday = ctx(2024, 6, 2);
        let r = rubrics(&sunday, Rank::DEFAULT, &[]);
        let out = run(
            ResolverId::Dismissal,
            &sunday,
            &r,
            &LogicArgs::new(),
            &EngineOptions::default(),
        );
        assert_eq!(
            out.lines,
            vec![
                DISMISSAL_RISEN,
                DISMISSAL_THEOTOKOS,
                "of St. Nicholas, patron of this holy temple;",
                DISMISSAL_CLOSE,
            ]
        );
    }

    #[test]
    fn isodikon_refrains() {
        let sunday = ctx(2024, 6, 2);
        let out = run(
            ResolverId::Isodikon,
            &sunday,
            &rubrics(&sunday, Rank::DEFAULT, &[]),
            &LogicArgs::new(),
            &EngineOptions::default(),
        );
        assert!(out.lines[0].ends_with(ISODIKON_SUNDAY));

        let tuesday = ctx(2024, 6, 4);
        let out = run(
            ResolverId::Isodikon,
            &tuesday,
            &rubrics(&tuesday, Rank::LOWEST, &[]),
            &LogicArgs::new(),
            &EngineOptions::default(),
        );
        assert!(out.lines[0].ends_with(ISODIKON_WEEKDAY));
    }

    #[test]
    fn magnification_follows_liturgy_argument() {
        let day = ctx(2024, 9, 3);
        let r = rubrics(&day, Rank::LOWEST, &[]);
        let options = EngineOptions::default();
        let plain = run(ResolverId::Magnification, &day, &r, &LogicArgs::new(), &options);
        assert_eq!(plain.refs, vec!["horologion.axion_estin"]);
        let basil = run(
            ResolverId::Magnification,
            &day,
            &r,
            &args(json!({"liturgy": "basil"})),
            &options,
        );
        assert_eq!(basil.refs, vec!["horologion.in_thee_rejoiceth"]);
    }

    #[test]
    fn katavasia_by_season() {
        let options = EngineOptions::default();
        let key = |y, m, d| {
            let day = ctx(y, m, d);
            let r = rubrics(&day, Rank::LOWEST, &[]);
            run(ResolverId::Katavasia, &day, &r, &LogicArgs::new(), &options).refs[0].clone()
        };
        assert_eq!(key(2024, 8, 20), "katavasia.cross_of_moses");
        assert_eq!(key(2024, 12, 1), "katavasia.christ_is_born");
        assert_eq!(key(2024, 4, 10), "katavasia.paschal_canon");
        assert_eq!(key(2024, 10, 10), "katavasia.i_shall_open");
    }

    #[test]
    fn lenten_weekday_odes() {
        // Wednesday of the second week of the Fast 2024
        let day = ctx(2024, 2, 21);
        assert_eq!(day.period(), Period::LentWeekday);
        let r = rubrics(&day, Rank::LOWEST, &[]);
        let out = run(
            ResolverId::CanonOdes,
            &day,
            &r,
            &LogicArgs::new(),
            &EngineOptions::default(),
        );
        assert_eq!(out.lines, vec!["Odes of the Triodion: 3, 8, 9"]);
        assert_eq!(out.refs.len(), 3);
        assert!(out.refs[0].ends_with(".canon_ode_3"));

        let ordinary = ctx(2024, 9, 4);
        let out = run(
            ResolverId::CanonOdes,
            &ordinary,
            &rubrics(&ordinary, Rank::LOWEST, &[]),
            &LogicArgs::new(),
            &EngineOptions::default(),
        );
        assert_eq!(out.refs, vec!["menaion.09_04.canon"]);
    }

    #[test]
    fn eothinon_parts() {
        // Sunday of All Saints 2024: eothinon 1
        let day = ctx(2024, 5, 26);
        let r = rubrics(&day, Rank::DEFAULT, &[]);
        let options = EngineOptions::default();
        let gospel = run(ResolverId::Eothinon, &day, &r, &LogicArgs::new(), &options);
        assert_eq!(gospel.refs, vec!["eothinon_1_gospel"]);
        let exapostilarion = run(
            ResolverId::Eothinon,
            &day,
            &r,
            &args(json!({"part": "exapostilarion"})),
            &options,
        );
        assert_eq!(exapostilarion.refs, vec!["eothinon_1_exapostilarion"]);
    }

    #[test]
    fn festal_forms_by_rank() {
        let day = ctx(2024, 9, 3);
        let options = EngineOptions::default();
        let low = rubrics(&day, Rank::LOWEST, &[]);
        let high = rubrics(&day, Rank::new(3).unwrap(), &["St. Phoebe"]);

        assert_eq!(
            run(ResolverId::DoxologyMode, &day, &low, &LogicArgs::new(), &options).refs,
            vec!["matins.daily_doxology"]
        );
        assert_eq!(
            run(ResolverId::DoxologyMode, &day, &high, &LogicArgs::new(), &options).refs,
            vec!["matins.great_doxology"]
        );
        assert_eq!(
            run(ResolverId::VespersEntrance, &day, &low, &LogicArgs::new(), &options).lines,
            vec!["No entrance."]
        );
        assert_eq!(
            run(ResolverId::Antiphons, &day, &high, &LogicArgs::new(), &options).refs,
            vec!["liturgy.antiphons_typical"]
        );
        assert_eq!(
            run(ResolverId::Antiphons, &day, &low, &LogicArgs::new(), &options).refs,
            vec!["liturgy.antiphons_daily"]
        );
        assert_eq!(
            run(ResolverId::VespersKathisma, &day, &low, &LogicArgs::new(), &options).refs,
            vec!["psalter.kathisma_18"]
        );
        assert_eq!(
            run(ResolverId::CommunionHymn, &day, &low, &LogicArgs::new(), &options).refs,
            vec!["horologion.koinonikon_tuesday"]
        );
    }

    #[test]
    fn lenten_weekday_sings_alleluia() {
        // Wednesday of the second week of Lent 2024
        let lenten = ctx(2024, 2, 21);
        let options = EngineOptions::default();
        let r = rubrics(&lenten, Rank::LOWEST, &[]);
        let out = run(ResolverId::GodIsTheLord, &lenten, &r, &LogicArgs::new(), &options);
        assert!(out.lines[0].starts_with("Alleluia"));
        assert_eq!(
            out.refs,
            vec![
                "matins.alleluia_verses".to_string(),
                format!("tone_{}.trinity_hymns", lenten.tone()),
            ]
        );

        // a polyeleos saint keeps God is the Lord even in Lent
        let mut festal = rubrics(&lenten, Rank::new(3).unwrap(), &[]);
        festal
            .commemorations
            .push(Commemoration::new("St. Leo", CommemorationKind::Polyeleos));
        let out = run(ResolverId::GodIsTheLord, &lenten, &festal, &LogicArgs::new(), &options);
        assert_eq!(out.refs, vec!["matins.god_is_the_lord"]);

        let ordinary = ctx(2024, 9, 3);
        let r = rubrics(&ordinary, Rank::LOWEST, &[]);
        let out = run(ResolverId::GodIsTheLord, &ordinary, &r, &LogicArgs::new(), &options);
        assert_eq!(out.lines, vec![format!("God is the Lord, in tone {}.", ordinary.tone())]);
    }

    #[test]
    fn trisagion_hymn_substitutes() {
        let options = EngineOptions::default();
        let hymn = args(json!({"form": "hymn"}));
        let key = |y, m, d| {
            let day = ctx(y, m, d);
            let r = rubrics(&day, Rank::DEFAULT, &[]);
            run(ResolverId::Trisagion, &day, &r, &hymn, &options).refs
        };
        assert_eq!(key(2024, 3, 31), vec!["liturgy.trisagion_baptismal"]);
        assert_eq!(key(2024, 1, 6), vec!["liturgy.trisagion_baptismal"]);
        assert_eq!(key(2024, 9, 14), vec!["liturgy.trisagion_cross"]);
        assert_eq!(key(2024, 9, 3), vec!["liturgy.trisagion_hymn"]);
    }

    #[test]
    fn paschal_season_replaces_trisagion_prayers() {
        let options = EngineOptions::default();
        let paschal = ctx(2024, 4, 10);
        let r = rubrics(&paschal, Rank::DEFAULT, &[]);
        let out = run(ResolverId::Trisagion, &paschal, &r, &LogicArgs::new(), &options);
        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.refs[0], "pentecostarion_day_0.troparion");

        let ordinary = ctx(2024, 9, 3);
        let r = rubrics(&ordinary, Rank::DEFAULT, &[]);
        let out = run(ResolverId::Trisagion, &ordinary, &r, &LogicArgs::new(), &options);
        assert!(out.lines.is_empty());
        assert_eq!(out.refs, vec!["horologion.trisagion", "horologion.our_father"]);
    }

    #[test]
    fn hours_troparia_by_day() {
        let options = EngineOptions::default();
        let lenten = ctx(2024, 2, 21);
        let r = rubrics(&lenten, Rank::LOWEST, &[]);
        let out = run(
            ResolverId::HoursTroparia,
            &lenten,
            &r,
            &args(json!({"hour": 3})),
            &options,
        );
        assert_eq!(out.lines, vec!["Lenten troparia of the Third Hour."]);
        assert_eq!(out.refs, vec!["hours.lenten_troparia"]);

        let sunday = ctx(2024, 9, 22);
        let r = rubrics(&sunday, Rank::DEFAULT, &["Martyr Phocas"]);
        let out = run(ResolverId::HoursTroparia, &sunday, &r, &LogicArgs::new(), &options);
        assert_eq!(
            out.refs,
            vec![
                format!("tone_{}.sat_vespers.troparia", sunday.tone()),
                "menaion.09_22.troparion".to_string(),
            ]
        );
    }

    #[test]
    fn sunday_kontakia_alternate_through_the_hours() {
        let options = EngineOptions::default();
        let sunday = ctx(2024, 9, 22);
        let r = rubrics(&sunday, Rank::DEFAULT, &["Martyr Phocas"]);
        let kontakion = |hour: u64| {
            run(
                ResolverId::HoursKontakion,
                &sunday,
                &r,
                &args(json!({"hour": hour})),
                &options,
            )
            .refs
        };
        let resurrection = format!("tone_{}.sun_liturgy.kontakion", sunday.tone());
        assert_eq!(kontakion(1), vec![resurrection.clone()]);
        assert_eq!(kontakion(3), vec!["menaion.09_22.kontakion".to_string()]);
        assert_eq!(kontakion(6), vec![resurrection]);

        let lenten = ctx(2024, 2, 21);
        let r = rubrics(&lenten, Rank::LOWEST, &[]);
        let out = run(ResolverId::HoursKontakion, &lenten, &r, &LogicArgs::new(), &options);
        assert!(out.refs.is_empty());
        assert_eq!(out.lines, vec!["Lord, have mercy (40 times)."]);
    }

    #[test]
    fn cherubic_hymn_of_holy_week() {
        let options = EngineOptions::default();
        let key = |y, m, d| {
            let day = ctx(y, m, d);
            let r = rubrics(&day, Rank::HIGHEST, &[]);
            run(ResolverId::CherubicHymn, &day, &r, &LogicArgs::new(), &options).refs
        };
        assert_eq!(key(2024, 3, 28), vec!["liturgy.cherubic_mystical_supper"]);
        assert_eq!(key(2024, 3, 30), vec!["liturgy.cherubic_let_all_mortal_flesh"]);
        assert_eq!(key(2024, 9, 3), vec!["liturgy.cherubic_hymn"]);
    }

    #[test]
    fn rubric_variable_binds_a_token() {
        let saturday = ctx(2024, 6, 1);
        let mut r = rubrics(&saturday, Rank::new(3).unwrap(), &["St. Justin"]);
        r.variables
            .insert("matins_theotokion".into(), "tone_4.theotokion_dogmatikon".into());
        let out = run(
            ResolverId::VariableReference,
            &saturday,
            &r,
            &args(json!({"token": "matins_theotokion", "fallback": "matins.theotokion_daily"})),
            &EngineOptions::default(),
        );
        assert_eq!(out.refs, vec!["tone_4.theotokion_dogmatikon"]);
    }
}
