use anyhow::{bail, Context, Result};

/// Raw value standing for "skill level not given".
pub const UNKNOWN_SKILL: &str = "N";

/// The self-reported skill level of one user in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLanguage {
    lang: String,
    skill_level: String,
    username: String,
    details: String,
}

impl UserLanguage {
    pub fn new(
        lang: impl Into<String>,
        skill_level: impl Into<String>,
        username: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            lang: lang.into(),
            skill_level: skill_level.into(),
            username: username.into(),
            details: details.into(),
        }
    }

    /// Build from one positional row: `lang`, `skill_level`, `username`, `details`.
    pub fn from_fields(fields: Vec<String>) -> Result<Self> {
        let n = fields.len();
        let Ok([lang, skill_level, username, details]) = <[String; 4]>::try_from(fields) else {
            bail!("expected 4 columns, found {}", n);
        };
        Ok(Self::new(lang, skill_level, username, details))
    }

    /// Language of this skill entry.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// `Ok(None)` when the level was reported as unknown, the parsed level otherwise.
    /// A value that is neither is an error.
    pub fn skill_level(&self) -> Result<Option<u32>> {
        if self.skill_level == UNKNOWN_SKILL {
            return Ok(None);
        }
        self.skill_level
            .trim()
            .parse::<u32>()
            .map(Some)
            .with_context(|| format!("invalid skill level {:?}", self.skill_level))
    }

    pub fn raw_skill_level(&self) -> &str {
        &self.skill_level
    }

    /// Name of the user who has this skill.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Free-text comment, possibly empty.
    pub fn details(&self) -> &str {
        &self.details
    }
}
