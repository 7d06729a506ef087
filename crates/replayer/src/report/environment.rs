//! Host metadata written into the report header.

use std::env;

/// Default culture when `LANG` is unset or unusable
pub const DEFAULT_CULTURE: &str = "en-US";

/// Runtime, platform and user details captured once per accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Version of the producing tool
    pub nunit_version: String,
    /// Runtime name
    pub clr_version: String,
    /// Operating system and architecture
    pub os_version: String,
    /// OS family
    pub platform: String,
    /// Working directory
    pub cwd: String,
    /// Host name
    pub machine_name: String,
    /// Login name
    pub user: String,
    /// User domain, falling back to the host name
    pub user_domain: String,
    /// Culture tag such as `en-US`
    pub culture: String,
}

impl Environment {
    /// Capture the current process environment
    #[must_use]
    pub fn capture() -> Self {
        let machine_name = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_default();
        let user_domain = env::var("USERDOMAIN").unwrap_or_else(|_| machine_name.clone());
        let cwd = env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        Self {
            nunit_version: env!("CARGO_PKG_VERSION").to_string(),
            clr_version: "rust".to_string(),
            os_version: format!("{} {}", env::consts::OS, env::consts::ARCH),
            platform: env::consts::FAMILY.to_string(),
            cwd,
            machine_name,
            user,
            user_domain,
            culture: culture_from_lang(env::var("LANG").ok().as_deref()),
        }
    }
}

/// Turn a POSIX locale (`en_US.UTF-8`) into a culture tag (`en-US`)
#[must_use]
pub fn culture_from_lang(lang: Option<&str>) -> String {
    let tag = lang
        .map(|l| l.split(['.', '@']).next().unwrap_or_default())
        .filter(|l| !l.is_empty() && *l != "C" && *l != "POSIX")
        .map(|l| l.replace('_', "-"));
    tag.unwrap_or_else(|| DEFAULT_CULTURE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_culture_from_lang() {
        assert_eq!(culture_from_lang(Some("en_US.UTF-8")), "en-US");
        assert_eq!(culture_from_lang(Some("de_DE@euro")), "de-DE");
        assert_eq!(culture_from_lang(Some("fr_CA")), "fr-CA");
        assert_eq!(culture_from_lang(Some("C.UTF-8")), "en-US");
        assert_eq!(culture_from_lang(Some("")), "en-US");
        assert_eq!(culture_from_lang(None), "en-US");
    }

    #[test]
    fn test_capture_fills_fixed_fields() {
        let env = Environment::capture();
        assert_eq!(env.clr_version, "rust");
        assert_eq!(env.nunit_version, env!("CARGO_PKG_VERSION"));
        assert!(!env.machine_name.is_empty());
        assert!(!env.culture.is_empty());
    }
}
