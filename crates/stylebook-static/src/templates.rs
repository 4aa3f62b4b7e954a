//! Templates of the stylebook UI.
//!
//! The theme renders the pages that belong to the UI itself: the index page,
//! the sketch page and token listings. Project templates go through the
//! adapters instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use minijinja::value::ValueKind;
use minijinja::{context, AutoEscape, Environment, Output};
use serde::Serialize;
use stylebook_core::{Config, NavigationItem, Page, State};

/// Index of the navigation root.
const ROOT_ID: &str = "index";

/// A navigation entry flattened for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub id: String,
    pub title: String,
    pub path: String,
    pub kind: String,
    /// Depth below the root
    pub level: usize,
}

/// Errors that can occur while rendering the theme.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Failed to render theme template {name}: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to load theme template {name}: {source}")]
    Load {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Template engine for the UI pages, using minijinja.
pub struct ThemeEngine {
    env: Environment<'static>,
}

impl ThemeEngine {
    /// Create a theme engine with the built-in templates.
    pub fn new() -> Result<Self, ThemeError> {
        let mut env = Environment::new();
        env.set_formatter(html_formatter);

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("sketch.html", SKETCH_TEMPLATE),
            ("tokens.html", TOKENS_TEMPLATE),
        ] {
            env.add_template_owned(name, source)
                .map_err(|source| ThemeError::Load { name, source })?;
        }

        Ok(Self { env })
    }

    fn render(&self, name: &'static str, ctx: minijinja::Value) -> Result<String, ThemeError> {
        self.env
            .get_template(name)
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(|source| ThemeError::Render { name, source })
    }

    /// The entry page with the serialized state embedded for the client.
    pub fn render_index(&self, state: &State, state_json: &str) -> Result<String, ThemeError> {
        self.render(
            "index.html",
            context! {
                config => &state.config,
                nav => flatten_navigation(&state.navigation),
                state_json => state_json,
                base_path => "",
            },
        )
    }

    /// Overview of all components and their variants.
    pub fn render_sketch(&self, state: &State) -> Result<String, ThemeError> {
        let components: Vec<_> = state
            .components
            .values()
            .filter(|component| !component.variants.is_empty())
            .collect();

        self.render(
            "sketch.html",
            context! {
                config => &state.config,
                components => components,
                base_path => "",
            },
        )
    }

    /// Token listing of a page.
    pub fn render_tokens(&self, config: &Config, page: &Page) -> Result<String, ThemeError> {
        let depth = 1 + page.id.matches('/').count();

        self.render(
            "tokens.html",
            context! {
                config => config,
                page => page,
                base_path => "../".repeat(depth),
            },
        )
    }
}

/// Escape strings for HTML without touching slashes, so ids and paths stay
/// readable in the output.
fn html_formatter(
    out: &mut Output<'_>,
    state: &minijinja::State<'_, '_>,
    value: &minijinja::Value,
) -> Result<(), minijinja::Error> {
    if matches!(state.auto_escape(), AutoEscape::None)
        || value.is_safe()
        || value.kind() != ValueKind::String
    {
        return minijinja::escape_formatter(out, state, value);
    }

    let text = value.as_str().unwrap_or_default();
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    out.write_str(&escaped)?;

    Ok(())
}

/// Walk the navigation depth first, starting at the index page.
///
/// Nodes not reachable from the root (no parent, a missing parent, or a
/// parent that does not list them) are walked afterwards from level zero so
/// nothing gets lost.
pub fn flatten_navigation(navigation: &BTreeMap<String, NavigationItem>) -> Vec<NavEntry> {
    let mut entries = Vec::new();
    let mut visited = BTreeSet::new();

    let mut roots: Vec<&str> = Vec::new();
    if navigation.contains_key(ROOT_ID) {
        roots.push(ROOT_ID);
    }
    roots.extend(
        navigation
            .values()
            .filter(|item| item.id != ROOT_ID)
            .filter(|item| match &item.parent_id {
                Some(parent) => !navigation.contains_key(parent),
                None => true,
            })
            .map(|item| item.id.as_str()),
    );
    roots.extend(navigation.keys().map(String::as_str));

    for root in roots {
        let mut stack = vec![(root, 0)];
        while let Some((id, level)) = stack.pop() {
            let Some(item) = navigation.get(id) else {
                continue;
            };
            if !visited.insert(id) {
                continue;
            }

            entries.push(NavEntry {
                id: item.id.clone(),
                title: item.title.clone(),
                path: item.path.clone(),
                kind: item.kind.clone(),
                level,
            });

            for child in item.child_ids.iter().rev() {
                stack.push((child.as_str(), level + 1));
            }
        }
    }

    entries
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ config.ui.lang or "en" }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ config.name }}{% endblock %}</title>
  <link rel="stylesheet" href="{{ base_path }}_assets/styles/stylebook.css">
  {% if config.ui.customStylesheet %}<link rel="stylesheet" href="{{ config.ui.customStylesheet }}">{% endif %}
</head>
<body class="{% block body_class %}stylebook{% endblock %}">
  {% block body %}{% endblock %}
  <script src="{{ base_path }}_assets/scripts/stylebook.js"></script>
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block body %}
<div class="stylebook-layout">
  <nav class="stylebook-nav">
    <header class="stylebook-nav__header">
      <a href="#/">{{ config.name }}</a>
      <span class="stylebook-nav__version">{{ config.version }}</span>
    </header>
    <ul class="stylebook-nav__list">
    {% for item in nav %}
      <li class="stylebook-nav__item stylebook-nav__item--{{ item.kind }}" style="--level: {{ item.level }}">
        <a href="#/{{ item.path }}" data-id="{{ item.id }}">{{ item.title }}</a>
      </li>
    {% endfor %}
    </ul>
  </nav>
  <main id="stylebook-app" class="stylebook-main"></main>
</div>
<script id="stylebook-state" type="application/json">{{ state_json | safe }}</script>
{% endblock %}"##;

const SKETCH_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}Sketch - {{ config.name }}{% endblock %}
{% block body_class %}stylebook stylebook--sketch{% endblock %}

{% block body %}
<main class="stylebook-sketch">
{% for component in components %}
  <section class="stylebook-sketch__component" id="{{ component.id }}">
    <h2>{{ component.title }}</h2>
    {% for variant in component.variants %}
    <article class="stylebook-sketch__variant" data-variant="{{ variant.id }}">
      <h3>{{ variant.title }} <code>{{ variant.id }}</code></h3>
      <iframe src="_variants/{{ variant.id }}.html" title="{{ variant.title }}" loading="lazy"></iframe>
    </article>
    {% endfor %}
  </section>
{% endfor %}
</main>
{% endblock %}"##;

const TOKENS_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}{{ page.title }} - {{ config.name }}{% endblock %}
{% block body_class %}stylebook stylebook--tokens{% endblock %}

{% block body %}
<main class="stylebook-tokens">
  <h1>{{ page.title }}</h1>
  {% if page.content %}<div class="stylebook-content">{{ page.content | safe }}</div>{% endif %}
  <table class="stylebook-tokens__table">
    <thead>
      <tr><th></th><th>Name</th><th>Value</th><th>Variable</th><th>Description</th></tr>
    </thead>
    <tbody>
    {% for token in page.tokens %}
      <tr class="stylebook-token stylebook-token--{{ token.type }}">
        <td>{% if token.type == "color" %}<span class="stylebook-token__swatch" style="background: {{ token.value }}"></span>{% endif %}</td>
        <td>{{ token.name }}</td>
        <td><code>{{ token.value }}</code></td>
        <td>{% if token.variable %}<code>{{ token.variable }}</code>{% endif %}</td>
        <td>{{ token.description or "" }}</td>
      </tr>
    {% endfor %}
    </tbody>
  </table>
</main>
{% endblock %}"##;
