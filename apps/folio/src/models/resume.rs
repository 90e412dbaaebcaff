use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The resume document baked into the binary at build time.
const EMBEDDED_RESUME: &str = include_str!("../../data/resume.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    /// Icon name; unknown names fall back to a generic globe glyph.
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub location: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
}

impl PersonalInfo {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub period: String,
    pub location: String,
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillCategory {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AboutMe {
    pub bio: Vec<String>,
    pub philosophy: String,
    #[serde(default)]
    pub interests: Vec<Interest>,
}

/// A blog post. At most one of `content` and `markdown_url` is expected to be
/// meaningful; `markdown_url` wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub read_time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Full inline markdown body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Raw markdown file to fetch the body from (e.g. a GitHub raw URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_url: Option<String>,
}

/// The whole resume. Loaded once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
    #[serde(default)]
    pub projects: Vec<Project>,
    pub about_me: AboutMe,
    #[serde(default)]
    pub blog_posts: Vec<BlogPost>,
}

impl ResumeDocument {
    /// Parses the document compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_RESUME).context("Embedded resume document is invalid")
    }

    /// Loads the document from `path` when given, otherwise the embedded one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read resume file {}", path.display()))?;
                Self::from_json(&raw)
                    .with_context(|| format!("Resume file {} is invalid", path.display()))
            }
            None => Self::embedded(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let doc: ResumeDocument = serde_json::from_str(raw)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn find_post(&self, id: &str) -> Option<&BlogPost> {
        self.blog_posts.iter().find(|p| p.id == id)
    }

    /// Post ids address detail pages, so they must be unique and non-empty.
    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for post in &self.blog_posts {
            if post.id.trim().is_empty() {
                anyhow::bail!("Blog post '{}' has an empty id", post.title);
            }
            if !seen.insert(post.id.as_str()) {
                anyhow::bail!("Duplicate blog post id '{}'", post.id);
            }
        }
        Ok(())
    }
}
