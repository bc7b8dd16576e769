//! # HTML Pages
//!
//! The web pages are minijinja templates kept as stand-alone files under
//! `templates/` and included here as string constants. `index.html` and
//! `message.html` extend `layout.html`.
//!
//! Every template name ends in `.html`, so minijinja escapes all interpolated
//! values. Nothing in this module escapes by hand.

use minijinja::{context, Environment, Error};

pub const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");
pub const MESSAGE_TEMPLATE: &str = include_str!("templates/message.html");

pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", LAYOUT_TEMPLATE)?;
        env.add_template("index.html", INDEX_TEMPLATE)?;
        env.add_template("message.html", MESSAGE_TEMPLATE)?;
        Ok(Self { env })
    }

    /// The note form.
    pub fn index(&self) -> Result<String, Error> {
        self.env
            .get_template("index.html")?
            .render(context! { title => "New note" })
    }

    /// A titled page with an optional link and plain-text paragraphs.
    pub fn message(
        &self,
        title: &str,
        url: Option<&str>,
        paragraphs: &[&str],
    ) -> Result<String, Error> {
        self.env.get_template("message.html")?.render(context! {
            title => title,
            url => url,
            paragraphs => paragraphs,
        })
    }
}
