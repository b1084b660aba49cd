use crate::scalar::LoneSurrogates;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapeSettings {
    /// How unpaired surrogate code units are escaped.
    lone_surrogates: LoneSurrogates,
    /// Stop at the first U+0000 code unit, treating the input as NUL-terminated.
    stop_at_nul: bool,
}

impl EscapeSettings {
    pub fn new() -> Self {
        EscapeSettings::default()
    }

    pub fn lone_surrogates(mut self, policy: LoneSurrogates) -> Self {
        self.lone_surrogates = policy;

        self
    }

    pub fn stop_at_nul(mut self, stop_at_nul: bool) -> Self {
        self.stop_at_nul = stop_at_nul;

        self
    }

    pub fn get_lone_surrogates(&self) -> LoneSurrogates {
        self.lone_surrogates
    }

    pub fn should_stop_at_nul(&self) -> bool {
        self.stop_at_nul
    }
}
