//! Fallback content rendered while the store holds no data for a section.
//!
//! # Responsibility
//! - Keep every hard-coded placeholder in one injectable value.
//!
//! # Invariants
//! - Fallbacks are display-only; they are never written to the store.
//! - An empty `services` list means the section is hidden.

use crate::model::contact::{ContactInfoFields, ContactKind};
use crate::model::icon::Icon;
use crate::model::profile::{AboutFields, ProfileFields};
use crate::model::project::ProjectFields;
use crate::model::service::ServiceFields;
use crate::model::skill::{SkillGroup, SkillLevel};

const DEFAULT_PROFICIENCY: i32 = 4;

/// Per-section fallback values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultContent {
    pub profile: ProfileFields,
    pub about: AboutFields,
    pub contact_info: Vec<ContactInfoFields>,
    pub skills: Vec<SkillGroup>,
    pub projects: Vec<ProjectFields>,
    pub services: Vec<ServiceFields>,
}

impl Default for DefaultContent {
    fn default() -> Self {
        Self {
            profile: ProfileFields {
                name: "John Doe".to_string(),
                title: "Full Stack Developer".to_string(),
                description: "Crafting beautiful, functional web experiences with modern \
                              technologies. Passionate about clean code and innovative solutions."
                    .to_string(),
                hero_image_url: None,
            },
            about: AboutFields {
                content: "I'm a passionate full stack developer with over 5 years of experience \
                          creating digital solutions that make a difference.\n\nI specialize in \
                          modern web technologies and love working with React, Node.js, and \
                          cloud platforms."
                    .to_string(),
                traits: strings(&[
                    "Problem Solving",
                    "Team Collaboration",
                    "Continuous Learning",
                    "Innovation",
                ]),
            },
            contact_info: vec![
                contact(
                    0,
                    ContactKind::Contact,
                    Icon::Mail,
                    "Email",
                    "john.doe@example.com",
                    "mailto:john.doe@example.com",
                ),
                contact(
                    1,
                    ContactKind::Contact,
                    Icon::Phone,
                    "Phone",
                    "+1 (555) 123-4567",
                    "tel:+15551234567",
                ),
                contact(
                    2,
                    ContactKind::Contact,
                    Icon::MapPin,
                    "Location",
                    "San Francisco, CA",
                    "#",
                ),
                contact(3, ContactKind::Social, Icon::Github, "GitHub", "GitHub", "#"),
                contact(4, ContactKind::Social, Icon::Linkedin, "LinkedIn", "LinkedIn", "#"),
                contact(5, ContactKind::Social, Icon::Twitter, "Twitter", "Twitter", "#"),
            ],
            skills: vec![
                group(
                    "Frontend",
                    &["React", "TypeScript", "Next.js", "Tailwind CSS", "Framer Motion"],
                ),
                group("Backend", &["Node.js", "Python", "PostgreSQL", "MongoDB", "GraphQL"]),
                group("Tools & Cloud", &["Docker", "AWS", "Git", "CI/CD", "Figma"]),
            ],
            projects: vec![
                project(
                    0,
                    "E-Commerce Platform",
                    "A full-stack e-commerce solution with real-time inventory management, \
                     payment processing, and admin dashboard.",
                    &["React", "Node.js", "PostgreSQL", "Stripe", "AWS"],
                ),
                project(
                    1,
                    "Task Management App",
                    "Collaborative project management tool with real-time updates, team chat, \
                     and advanced analytics.",
                    &["Next.js", "TypeScript", "Prisma", "Socket.io", "Tailwind"],
                ),
                project(
                    2,
                    "AI Content Generator",
                    "AI-powered content creation platform that helps users generate blog posts, \
                     social media content, and marketing copy.",
                    &["React", "Python", "OpenAI API", "FastAPI", "Docker"],
                ),
                project(
                    3,
                    "Real Estate Dashboard",
                    "Comprehensive dashboard for real estate professionals with property \
                     listings, analytics, and client management.",
                    &["Vue.js", "Express", "MongoDB", "Chart.js", "Mapbox"],
                ),
            ],
            services: Vec::new(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn contact(
    order_index: i32,
    kind: ContactKind,
    icon: Icon,
    label: &str,
    value: &str,
    href: &str,
) -> ContactInfoFields {
    ContactInfoFields {
        kind,
        label: label.to_string(),
        value: value.to_string(),
        href: href.to_string(),
        icon,
        order_index,
    }
}

fn group(title: &str, skills: &[&str]) -> SkillGroup {
    SkillGroup {
        title: title.to_string(),
        skills: skills
            .iter()
            .map(|name| SkillLevel {
                name: (*name).to_string(),
                proficiency: DEFAULT_PROFICIENCY,
            })
            .collect(),
    }
}

fn project(
    order_index: i32,
    title: &str,
    description: &str,
    technologies: &[&str],
) -> ProjectFields {
    ProjectFields {
        title: title.to_string(),
        description: description.to_string(),
        technologies: strings(technologies),
        image_url: None,
        github_url: Some("#".to_string()),
        live_url: Some("#".to_string()),
        featured: false,
        order_index,
    }
}
