//! Symbolic reference resolution
//!
//! Templates refer to seasonal material by abstract tokens
//! (`stichera_resurrection`, `canon_triodion`, ...). A [`VariableMap`] is
//! built fresh for each lookup from the context's tone, eothinon number and
//! seasonal day key, then the token is looked up in it. Nothing is cached
//! between calls, so two contexts can never see each other's mapping.

use std::collections::BTreeMap;

use typikon_calendar::{Context, LiturgicalBook};

/// Inputs the mapping is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInputs {
    /// Tone used for octoechos material
    pub tone: u8,
    /// Eothinon gospel number
    pub eothinon: u8,
    /// Seasonal book and day key, e.g. (`Triodion`, `triodion_day_-7`)
    pub season_day: Option<(LiturgicalBook, String)>,
}

impl VariableInputs {
    /// Derive inputs from a context
    #[must_use]
    pub fn from_context(context: &Context) -> Self {
        Self {
            tone: context.tone(),
            eothinon: context.eothinon(),
            season_day: context
                .season_day_key()
                .map(|key| (context.season().book(), key)),
        }
    }

    /// Use a different tone (e.g. the coming Sunday's at a Saturday vigil)
    #[must_use]
    pub fn with_tone(mut self, tone: u8) -> Self {
        self.tone = tone;
        self
    }
}

/// Token → concrete asset key mapping for one context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableMap {
    entries: BTreeMap<&'static str, String>,
}

impl VariableMap {
    /// Build the mapping
    #[must_use]
    pub fn build(inputs: &VariableInputs) -> Self {
        let tone = inputs.tone;
        let eothinon = inputs.eothinon;
        let mut entries = BTreeMap::new();

        entries.insert(
            "stichera_resurrection",
            format!("tone_{tone}.sat_vespers.stichera_lord_i_call"),
        );
        entries.insert(
            "aposticha_resurrection",
            format!("tone_{tone}.sat_vespers.stichera_aposticha"),
        );
        entries.insert(
            "troparion_resurrection",
            format!("tone_{tone}.sat_vespers.troparia"),
        );
        entries.insert(
            "sessional_resurrection",
            format!("tone_{tone}.sun_matins.sessionals"),
        );
        entries.insert(
            "stichera_praises",
            format!("tone_{tone}.sun_matins.stichera_praises"),
        );

        entries.insert("eothinon_gospel", format!("eothinon_{eothinon}_gospel"));
        entries.insert("eothinon_hymn", format!("eothinon_{eothinon}_stichera"));
        entries.insert(
            "exapostilarion_resurrection",
            format!("eothinon_{eothinon}_exapostilarion"),
        );

        match &inputs.season_day {
            Some((LiturgicalBook::Triodion, day)) => {
                entries.insert("stichera_triodion", format!("{day}.sat_vespers.stichera_vespers"));
                entries.insert("aposticha_triodion", format!("{day}.sat_vespers.aposticha"));
                entries.insert("canon_triodion", format!("{day}.sun_matins.canon_ode_9"));
                entries.insert(
                    "exapostilarion_triodion",
                    format!("{day}.sun_matins.exapostilarion"),
                );
                entries.insert(
                    "stichera_praises_triodion",
                    format!("{day}.sun_matins.stichera_praises"),
                );
                entries.insert("sessional_triodion", format!("{day}.sat_matins.sessional"));
            }
            Some((LiturgicalBook::Pentecostarion, day)) => {
                entries.insert(
                    "stichera_pentecostarion",
                    format!("{day}.sat_vespers.stichera_vespers"),
                );
                entries.insert(
                    "aposticha_pentecostarion",
                    format!("{day}.sat_vespers.aposticha"),
                );
                entries.insert("canon_pentecostarion", format!("{day}.sun_matins.canon"));
                entries.insert(
                    "exapostilarion_pentecostarion",
                    format!("{day}.sun_matins.exapostilarion"),
                );
                entries.insert(
                    "stichera_praises_pentecostarion",
                    format!("{day}.sun_matins.stichera_praises"),
                );
            }
            Some((LiturgicalBook::Octoechos, _)) | None => {}
        }

        Self { entries }
    }

    /// Concrete key for a token
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// Tokens known in this context
    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

/// Resolve a symbolic token against a context
///
/// Returns `None` for tokens with no mapping in this context; the caller
/// decides whether that is a placeholder or a failure.
#[must_use]
pub fn resolve_variable(token: &str, context: &Context) -> Option<String> {
    VariableMap::build(&VariableInputs::from_context(context))
        .resolve(token)
        .map(str::to_string)
}
