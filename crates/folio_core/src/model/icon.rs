//! Closed set of contact icons.
//!
//! Icons are persisted by name (`"Mail"`, `"MapPin"`, ...) and resolved through
//! one static table; unknown names fail row decoding instead of rendering
//! nothing.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Icon identifier stored in `contact_info.icon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Mail,
    Phone,
    MapPin,
    Github,
    Linkedin,
    Twitter,
    Globe,
}

/// Static rendering data for one icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSpec {
    pub icon: Icon,
    /// Persisted name.
    pub name: &'static str,
    /// Human label used by admin pickers.
    pub label: &'static str,
    /// Slug in the lucide icon set.
    pub slug: &'static str,
    /// Plain-text glyph for non-graphical renderers.
    pub glyph: &'static str,
}

const ICON_TABLE: &[IconSpec] = &[
    IconSpec {
        icon: Icon::Mail,
        name: "Mail",
        label: "Email",
        slug: "mail",
        glyph: "\u{2709}",
    },
    IconSpec {
        icon: Icon::Phone,
        name: "Phone",
        label: "Phone",
        slug: "phone",
        glyph: "\u{260E}",
    },
    IconSpec {
        icon: Icon::MapPin,
        name: "MapPin",
        label: "Location",
        slug: "map-pin",
        glyph: "\u{1F4CD}",
    },
    IconSpec {
        icon: Icon::Github,
        name: "Github",
        label: "GitHub",
        slug: "github",
        glyph: "\u{1F431}",
    },
    IconSpec {
        icon: Icon::Linkedin,
        name: "Linkedin",
        label: "LinkedIn",
        slug: "linkedin",
        glyph: "\u{1F4BC}",
    },
    IconSpec {
        icon: Icon::Twitter,
        name: "Twitter",
        label: "Twitter",
        slug: "twitter",
        glyph: "\u{1F426}",
    },
    IconSpec {
        icon: Icon::Globe,
        name: "Globe",
        label: "Website",
        slug: "globe",
        glyph: "\u{1F310}",
    },
];

impl Icon {
    /// Every supported icon in picker order.
    pub const ALL: [Icon; 7] = [
        Icon::Mail,
        Icon::Phone,
        Icon::MapPin,
        Icon::Github,
        Icon::Linkedin,
        Icon::Twitter,
        Icon::Globe,
    ];

    pub fn spec(self) -> &'static IconSpec {
        // Table rows are declared in enum order.
        &ICON_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn glyph(self) -> &'static str {
        self.spec().glyph
    }

    pub fn slug(self) -> &'static str {
        self.spec().slug
    }

    /// Resolves a persisted icon name.
    pub fn from_name(name: &str) -> Option<Icon> {
        ICON_TABLE
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.icon)
    }
}

impl Display for Icon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
