//! Hero view
//!
//! Builds the element subtree of the landing section. The subtree is
//! created detached; the host attaches `root` when it is ready to show it.

use hero_core::{ElementId, ElementTree};
use serde::Serialize;
use smallvec::SmallVec;

use crate::content::HeroContent;
use crate::error::Result;

/// Class toggled on interactive links while the pointer is over them
pub const HOVER_CLASS: &str = "is-hovered";

/// Animated parts of the view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Title,
    Subtitle,
    Description,
    OrbA,
    OrbB,
    Badge,
    NameHighlight,
    CtaRow,
    Cta,
    SocialRow,
    Social,
    ScrollIndicator,
    ScrollBob,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Title => "title",
            Role::Subtitle => "subtitle",
            Role::Description => "description",
            Role::OrbA => "orb-a",
            Role::OrbB => "orb-b",
            Role::Badge => "badge",
            Role::NameHighlight => "name-highlight",
            Role::CtaRow => "cta-row",
            Role::Cta => "cta",
            Role::SocialRow => "social-row",
            Role::Social => "social",
            Role::ScrollIndicator => "scroll-indicator",
            Role::ScrollBob => "scroll-bob",
        }
    }

    /// Class selector for roles animated by class rather than by element
    pub fn selector(self) -> Option<&'static str> {
        match self {
            Role::OrbA => Some("hero-orb-1"),
            Role::OrbB => Some("hero-orb-2"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Element handles of a rendered hero view
#[derive(Clone, Debug)]
pub struct HeroView {
    pub root: ElementId,
    pub orbs: [ElementId; 2],
    pub badge: ElementId,
    pub title: ElementId,
    pub name_highlight: ElementId,
    pub subtitle: ElementId,
    pub description: ElementId,
    pub cta_row: ElementId,
    pub ctas: SmallVec<[ElementId; 2]>,
    pub social_row: ElementId,
    pub socials: SmallVec<[ElementId; 4]>,
    pub scroll_indicator: ElementId,
    pub scroll_bob: ElementId,
}

impl HeroView {
    /// Build the detached `section#home` subtree
    pub fn build(tree: &mut ElementTree, content: &HeroContent) -> Result<Self> {
        let mut b = Builder { tree };

        let root = b.element("section", &["hero"])?;
        b.tree.set_attribute(root, "id", "home")?;

        let orb_a = b.child(root, "div", &["hero-orb-1"])?;
        let orb_b = b.child(root, "div", &["hero-orb-2"])?;
        b.child(root, "div", &["hero-grid"])?;

        let body = b.child(root, "div", &["hero-content"])?;

        let badge = b.child(body, "div", &["hero-badge"])?;
        let badge_label = b.child(badge, "span", &["badge-label"])?;
        b.child(badge_label, "span", &["badge-dot"])?;
        b.text(badge_label, "span", &content.badge)?;

        let title = b.child(body, "h1", &["hero-title"])?;
        b.text(title, "span", &content.greeting)?;
        let name = b.child(title, "span", &["hero-name"])?;
        b.text(name, "span", &content.name)?;
        let name_highlight = b.child(name, "span", &["hero-name-highlight"])?;

        let subtitle = b.child(body, "p", &["hero-subtitle"])?;
        b.tree.set_text(subtitle, &content.tagline)?;

        let description = b.child(body, "p", &["hero-description"])?;
        b.tree.set_text(description, &content.description)?;

        let cta_row = b.child(body, "div", &["hero-ctas"])?;
        let mut ctas = SmallVec::new();
        for cta in &content.ctas {
            let link = b.child(cta_row, "a", &[cta.style.class()])?;
            b.tree.set_attribute(link, "href", &cta.href)?;
            b.text(link, "span", &cta.label)?;
            if let Some(icon) = &cta.icon {
                b.icon(link, icon)?;
            }
            ctas.push(link);
        }

        let social_row = b.child(body, "div", &["hero-socials"])?;
        let mut socials = SmallVec::new();
        for social in &content.socials {
            let link = b.child(social_row, "a", &["social-icon"])?;
            b.tree.set_attribute(link, "href", &social.href)?;
            b.tree.set_attribute(link, "target", "_blank")?;
            b.tree.set_attribute(link, "rel", "noopener noreferrer")?;
            b.tree.set_attribute(link, "aria-label", &social.label)?;
            b.icon(link, &social.icon)?;
            socials.push(link);
        }

        let scroll_indicator = b.child(root, "div", &["hero-scroll"])?;
        let scroll_bob = b.child(scroll_indicator, "div", &["hero-scroll-bob"])?;
        b.text(scroll_bob, "span", "Scroll")?;
        b.icon(scroll_bob, "arrow-down")?;

        tracing::debug!(
            "built hero view: {} ctas, {} social links",
            ctas.len(),
            socials.len()
        );

        Ok(Self {
            root,
            orbs: [orb_a, orb_b],
            badge,
            title,
            name_highlight,
            subtitle,
            description,
            cta_row,
            ctas,
            social_row,
            socials,
            scroll_indicator,
            scroll_bob,
        })
    }

    /// Elements playing `role`, in document order
    pub fn elements(&self, role: Role) -> SmallVec<[ElementId; 4]> {
        match role {
            Role::Title => SmallVec::from_slice(&[self.title]),
            Role::Subtitle => SmallVec::from_slice(&[self.subtitle]),
            Role::Description => SmallVec::from_slice(&[self.description]),
            Role::OrbA => SmallVec::from_slice(&[self.orbs[0]]),
            Role::OrbB => SmallVec::from_slice(&[self.orbs[1]]),
            Role::Badge => SmallVec::from_slice(&[self.badge]),
            Role::NameHighlight => SmallVec::from_slice(&[self.name_highlight]),
            Role::CtaRow => SmallVec::from_slice(&[self.cta_row]),
            Role::Cta => self.ctas.iter().copied().collect(),
            Role::SocialRow => SmallVec::from_slice(&[self.social_row]),
            Role::Social => self.socials.clone(),
            Role::ScrollIndicator => SmallVec::from_slice(&[self.scroll_indicator]),
            Role::ScrollBob => SmallVec::from_slice(&[self.scroll_bob]),
        }
    }

    /// Role of an element, if it plays one
    pub fn role_of(&self, element: ElementId) -> Option<Role> {
        ALL_ROLES
            .iter()
            .copied()
            .find(|role| self.elements(*role).contains(&element))
    }

    /// Whether the element reacts to pointer interaction
    pub fn is_interactive(&self, element: ElementId) -> bool {
        self.ctas.contains(&element) || self.socials.contains(&element)
    }
}

const ALL_ROLES: [Role; 13] = [
    Role::Title,
    Role::Subtitle,
    Role::Description,
    Role::OrbA,
    Role::OrbB,
    Role::Badge,
    Role::NameHighlight,
    Role::CtaRow,
    Role::Cta,
    Role::SocialRow,
    Role::Social,
    Role::ScrollIndicator,
    Role::ScrollBob,
];

struct Builder<'a> {
    tree: &'a mut ElementTree,
}

impl Builder<'_> {
    fn element(&mut self, tag: &str, classes: &[&str]) -> Result<ElementId> {
        let id = self.tree.create(tag);
        for class in classes {
            self.tree.add_class(id, class)?;
        }
        Ok(id)
    }

    fn child(&mut self, parent: ElementId, tag: &str, classes: &[&str]) -> Result<ElementId> {
        let id = self.element(tag, classes)?;
        self.tree.append_child(parent, id)?;
        Ok(id)
    }

    fn text(&mut self, parent: ElementId, tag: &str, text: &str) -> Result<ElementId> {
        let id = self.child(parent, tag, &[])?;
        self.tree.set_text(id, text)?;
        Ok(id)
    }

    /// Opaque leaf for the icon collaborator
    fn icon(&mut self, parent: ElementId, name: &str) -> Result<ElementId> {
        let id = self.child(parent, "icon", &[])?;
        self.tree.set_attribute(id, "data-icon", name)?;
        Ok(id)
    }
}
