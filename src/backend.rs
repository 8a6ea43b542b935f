//! Image backend name resolution.

use std::fmt;

/// Image backends that can appear in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Never returns an image.
    Dummy,
    /// Returns a fixed URL.
    Placeholder,
    /// Pixabay stock photo search.
    Pixabay,
    /// `OpenAI` image generation.
    OpenAi,
}

/// Alternative spellings accepted in config files and on the command line.
const ALIASES: &[(&str, BackendKind)] = &[
    ("dummy", BackendKind::Dummy),
    ("noop", BackendKind::Dummy),
    ("none", BackendKind::Dummy),
    ("placeholder", BackendKind::Placeholder),
    ("static", BackendKind::Placeholder),
    ("pixabay", BackendKind::Pixabay),
    ("openai", BackendKind::OpenAi),
    ("dalle", BackendKind::OpenAi),
    ("gpt-image", BackendKind::OpenAi),
];

impl BackendKind {
    /// Every backend, in documentation order.
    pub const ALL: [Self; 4] = [Self::Dummy, Self::Placeholder, Self::Pixabay, Self::OpenAi];

    /// Resolve a backend name (case-insensitive, aliases allowed).
    ///
    /// # Errors
    ///
    /// Returns an error if the name doesn't match a known backend.
    pub fn from_name(name: &str) -> Result<Self, String> {
        let wanted = name.trim().to_ascii_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == wanted)
            .map(|&(_, kind)| kind)
            .ok_or_else(|| {
                format!(
                    "Unknown image backend '{name}'. \
                     Expected one of: dummy, placeholder, pixabay, openai."
                )
            })
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::Placeholder => "placeholder",
            Self::Pixabay => "pixabay",
            Self::OpenAi => "openai",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
