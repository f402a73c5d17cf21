pub struct LocalizableStr<'a> {
    pub english: &'a str,
}
#[derive(Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize, Default)]
pub enum Language {
    #[default]
    English,
}
impl<'a> LocalizableStr<'a> {
    pub fn localize(&self, language: Language) -> &'a str {
        match language {
            Language::English => self.english,
        }
    }
}

// window
pub const CURRENT_DATA_FILE: LocalizableStr<'static> = LocalizableStr {
    english: "Current data file:",
};
pub const SELECT_DATA_FILE: LocalizableStr<'static> = LocalizableStr {
    english: "Select new data file",
};
pub const TIME_STEP: LocalizableStr<'static> = LocalizableStr {
    english: "Time step",
};
pub const TEMPERATURE: LocalizableStr<'static> = LocalizableStr {
    english: "Temperature",
};
pub const CONCENTRATION: LocalizableStr<'static> = LocalizableStr {
    english: "Concentration",
};
pub const OK: LocalizableStr<'static> = LocalizableStr { english: "Ok" };
pub const CANCEL: LocalizableStr<'static> = LocalizableStr { english: "Cancel" };
