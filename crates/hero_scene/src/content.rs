//! Hero content
//!
//! Everything the view displays. Defaults reproduce the shipped landing
//! page; a content file only needs the fields it changes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Visual weight of a call-to-action button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaStyle {
    #[default]
    Primary,
    Secondary,
}

impl CtaStyle {
    pub fn class(self) -> &'static str {
        match self {
            CtaStyle::Primary => "btn-primary",
            CtaStyle::Secondary => "btn-secondary",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub style: CtaStyle,
    /// Trailing icon name, if any
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Accessible label, also used to tell links apart
    pub label: String,
    pub href: String,
    pub icon: String,
}

/// Text and links shown by the hero view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroContent {
    pub greeting: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub badge: String,
    pub ctas: Vec<CallToAction>,
    pub socials: Vec<SocialLink>,
}

impl Default for HeroContent {
    fn default() -> Self {
        Self {
            greeting: "Hi, I'm".to_string(),
            name: "Adarsh Tiwari".to_string(),
            tagline: "Aspiring Software Development Engineer".to_string(),
            description: "I build scalable, performant, and maintainable web applications, \
                          focusing on clean architecture, efficient problem-solving, and \
                          real-world impact."
                .to_string(),
            badge: "Available for opportunities".to_string(),
            ctas: vec![
                CallToAction {
                    label: "View Projects".to_string(),
                    href: "#projects".to_string(),
                    style: CtaStyle::Primary,
                    icon: Some("arrow-down".to_string()),
                },
                CallToAction {
                    label: "Get in Touch".to_string(),
                    href: "#contact".to_string(),
                    style: CtaStyle::Secondary,
                    icon: None,
                },
            ],
            socials: vec![
                SocialLink {
                    label: "GitHub".to_string(),
                    href: "https://github.com".to_string(),
                    icon: "github".to_string(),
                },
                SocialLink {
                    label: "LinkedIn".to_string(),
                    href: "https://linkedin.com".to_string(),
                    icon: "linkedin".to_string(),
                },
                SocialLink {
                    label: "Email".to_string(),
                    href: "mailto:hello@shreyansh.dev".to_string(),
                    icon: "mail".to_string(),
                },
            ],
        }
    }
}

impl HeroContent {
    /// Check the content can be rendered
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SceneError::Content("name must not be empty".into()));
        }
        for cta in &self.ctas {
            if cta.label.trim().is_empty() || cta.href.trim().is_empty() {
                return Err(SceneError::Content(format!(
                    "call to action '{}' needs a label and an href",
                    cta.label
                )));
            }
        }
        for (index, social) in self.socials.iter().enumerate() {
            if social.href.trim().is_empty() || social.icon.trim().is_empty() {
                return Err(SceneError::Content(format!(
                    "social link '{}' needs an href and an icon",
                    social.label
                )));
            }
            if self.socials[..index].iter().any(|s| s.label == social.label) {
                return Err(SceneError::Content(format!(
                    "duplicate social link '{}'",
                    social.label
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let content = HeroContent::default();
        assert!(content.validate().is_ok());
        assert_eq!(content.socials.len(), 3);
        assert_eq!(content.ctas[0].href, "#projects");
    }

    #[test]
    fn test_empty_name_rejected() {
        let content = HeroContent {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(content.validate(), Err(SceneError::Content(_))));
    }

    #[test]
    fn test_duplicate_social_rejected() {
        let mut content = HeroContent::default();
        let github = content.socials[0].clone();
        content.socials.push(github);

        let err = content.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid content: duplicate social link 'GitHub'");
    }
}
