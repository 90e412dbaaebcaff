use std::path::{Path, PathBuf};

use minijinja::{context, Environment, Error, ErrorKind};

use crate::chat::widget::APOLOGY;
use crate::markdown::render_markdown;
use crate::models::resume::{PersonalInfo, ResumeDocument};
use crate::view::{Shell, Tab, ViewState};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("blog_list.html", include_str!("../../templates/blog_list.html")),
    ("blog_detail.html", include_str!("../../templates/blog_detail.html")),
];

/// Maps an icon name from the resume document to a text glyph.
/// Unknown names render as a globe.
pub fn icon_glyph(name: &str) -> &'static str {
    match name.to_ascii_lowercase().as_str() {
        "linkedin" => "in",
        "github" => "</>",
        "twitter" | "x" => "𝕏",
        "mail" | "email" => "✉",
        "shield" => "🛡",
        "cpu" => "⚙",
        "lock" => "🔒",
        "book" => "📖",
        "code" => "⌨",
        _ => "🌐",
    }
}

/// Renders the three shell views from embedded templates.
pub struct PageRenderer {
    env: Environment<'static>,
    assets_dir: PathBuf,
}

impl PageRenderer {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_filter("glyph", |name: String| icon_glyph(&name).to_string());
        // Shown by the chat script when the turn request itself fails.
        env.add_global("apology", APOLOGY);

        Ok(Self {
            env,
            assets_dir: assets_dir.into(),
        })
    }

    pub fn render(&self, shell: &Shell, resume: &ResumeDocument) -> Result<String, Error> {
        let info = &resume.personal_info;
        let avatar = self.avatar_src(info);
        let tab = match shell.view().active_tab() {
            Tab::About => "about",
            Tab::Blog => "blog",
        };

        match shell.view() {
            ViewState::About => self.env.get_template("about.html")?.render(context! {
                info => info,
                avatar => avatar,
                tab => tab,
                about => &resume.about_me,
                experience => &resume.experience,
                show_header => true,
            }),
            ViewState::BlogList => self.env.get_template("blog_list.html")?.render(context! {
                info => info,
                avatar => avatar,
                tab => tab,
                posts => &resume.blog_posts,
                show_header => true,
            }),
            ViewState::BlogDetail { post_id } => {
                let post = resume.find_post(post_id).ok_or_else(|| {
                    Error::new(ErrorKind::UndefinedError, format!("unknown post {post_id}"))
                })?;
                let state = shell.post_state();
                self.env.get_template("blog_detail.html")?.render(context! {
                    info => info,
                    tab => tab,
                    post => post,
                    loading => state.is_loading(),
                    body_html => state.text().map(render_markdown),
                    show_header => false,
                })
            }
        }
    }

    /// Avatar URL to show, or `None` for the placeholder glyph. Paths under
    /// `/assets/` must exist in the assets directory.
    fn avatar_src(&self, info: &PersonalInfo) -> Option<String> {
        let url = info.avatar_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        match url.strip_prefix("/assets/") {
            Some(relative) if !self.asset_exists(relative) => None,
            _ => Some(url.to_string()),
        }
    }

    fn asset_exists(&self, relative: &str) -> bool {
        !relative.split('/').any(|segment| segment == "..")
            && self.assets_dir.join(Path::new(relative)).is_file()
    }
}
