//! Stylesheet and script of the stylebook UI.

use std::path::{Path, PathBuf};

/// Where the theme assets go, relative to the target directory.
pub const STYLES_PATH: &str = "_assets/styles/stylebook.css";
pub const SCRIPTS_PATH: &str = "_assets/scripts/stylebook.js";

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The UI stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// The UI script rendering pages from the embedded state.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }

    /// Write the assets below `target`, returning the written paths.
    ///
    /// A stylesheet that fails to minify is written as is.
    pub async fn write_to(target: &Path, minify: bool) -> std::io::Result<Vec<PathBuf>> {
        let css = Self::generate_css();
        let css = if minify {
            Self::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Writing unminified stylesheet: {}", e);
                css
            })
        } else {
            css
        };

        let mut written = Vec::new();
        for (relative, contents) in [(STYLES_PATH, css), (SCRIPTS_PATH, Self::generate_js())] {
            let path = target.join(relative);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, contents).await?;
            written.push(path);
        }

        Ok(written)
    }
}

const DEFAULT_CSS: &str = r#"/* Stylebook UI */

:root {
  --stylebook-nav-width: 260px;
  --stylebook-background: #ffffff;
  --stylebook-foreground: #1f2328;
  --stylebook-muted: #f6f8fa;
  --stylebook-muted-foreground: #59636e;
  --stylebook-border: #d1d9e0;
  --stylebook-accent: #0969da;
  --stylebook-radius: 0.375rem;
  --stylebook-font: system-ui, -apple-system, sans-serif;
  --stylebook-mono: ui-monospace, SFMono-Regular, monospace;
}

* {
  box-sizing: border-box;
}

body.stylebook {
  margin: 0;
  font-family: var(--stylebook-font);
  background: var(--stylebook-background);
  color: var(--stylebook-foreground);
  line-height: 1.6;
}

.stylebook-layout {
  display: grid;
  grid-template-columns: var(--stylebook-nav-width) 1fr;
  min-height: 100vh;
}

/* Navigation */
.stylebook-nav {
  position: sticky;
  top: 0;
  height: 100vh;
  overflow-y: auto;
  padding: 1.5rem 1rem;
  background: var(--stylebook-muted);
  border-right: 1px solid var(--stylebook-border);
}

.stylebook-nav__header {
  display: flex;
  align-items: baseline;
  gap: 0.5rem;
  margin-bottom: 1.5rem;
  font-weight: 700;
}

.stylebook-nav__header a {
  color: inherit;
  text-decoration: none;
}

.stylebook-nav__version {
  font-size: 0.75rem;
  font-weight: 400;
  color: var(--stylebook-muted-foreground);
}

.stylebook-nav__list {
  list-style: none;
  margin: 0;
  padding: 0;
}

.stylebook-nav__item {
  padding-left: calc(var(--level, 0) * 0.75rem);
}

.stylebook-nav__item a {
  display: block;
  padding: 0.25rem 0.5rem;
  border-radius: var(--stylebook-radius);
  color: var(--stylebook-muted-foreground);
  text-decoration: none;
}

.stylebook-nav__item a:hover,
.stylebook-nav__item a.is-active {
  background: var(--stylebook-background);
  color: var(--stylebook-foreground);
}

.stylebook-nav__item--component a {
  font-family: var(--stylebook-mono);
  font-size: 0.875rem;
}

/* Content */
.stylebook-main,
.stylebook-sketch,
.stylebook-tokens {
  padding: 2rem;
  max-width: 960px;
}

.stylebook-content pre,
.stylebook-code {
  padding: 1rem;
  overflow-x: auto;
  background: var(--stylebook-muted);
  border: 1px solid var(--stylebook-border);
  border-radius: var(--stylebook-radius);
  font-family: var(--stylebook-mono);
  font-size: 0.875rem;
}

/* Variants */
.stylebook-variant,
.stylebook-sketch__variant {
  margin-bottom: 2rem;
}

.stylebook-variant iframe,
.stylebook-sketch__variant iframe {
  width: 100%;
  min-height: 120px;
  border: 1px solid var(--stylebook-border);
  border-radius: var(--stylebook-radius);
  background: var(--stylebook-background);
}

/* Tokens */
.stylebook-tokens__table {
  width: 100%;
  border-collapse: collapse;
}

.stylebook-tokens__table th,
.stylebook-tokens__table td {
  padding: 0.5rem;
  text-align: left;
  border-bottom: 1px solid var(--stylebook-border);
}

.stylebook-token__swatch {
  display: inline-block;
  width: 2rem;
  height: 2rem;
  border: 1px solid var(--stylebook-border);
  border-radius: var(--stylebook-radius);
}

@media (max-width: 768px) {
  .stylebook-layout {
    grid-template-columns: 1fr;
  }

  .stylebook-nav {
    position: static;
    height: auto;
  }
}
"#;

const DEFAULT_JS: &str = r#"// Stylebook UI
(function() {
  'use strict';

  const stateElement = document.getElementById('stylebook-state');
  const app = document.getElementById('stylebook-app');
  if (!stateElement || !app) return;

  const state = JSON.parse(stateElement.textContent);

  const escape = (text) => String(text == null ? '' : text)
    .replace(/&/g, '&amp;')
    .replace(/</g, '&lt;')
    .replace(/>/g, '&gt;');

  const findItem = (path) =>
    Object.values(state.navigation).find(item => item.path === path) ||
    state.navigation.index;

  const renderVariant = (variant) => {
    const parts = (variant.parts || []).map(part =>
      `<details><summary>${escape(part.title)}</summary>` +
      `<pre class="stylebook-code"><code class="language-${escape(part.lang)}">${escape(part.content)}</code></pre></details>`
    ).join('');

    return `<section class="stylebook-variant" id="${escape(variant.id)}">` +
      `<h2>${escape(variant.title)}</h2>` +
      (variant.content || '') +
      `<iframe src="_variants/${variant.id}.html" title="${escape(variant.title)}"></iframe>` +
      parts +
      `</section>`;
  };

  const renderComponent = (component) =>
    `<h1>${escape(component.title)}</h1>` +
    `<div class="stylebook-content">${component.content || ''}</div>` +
    component.variants.map(renderVariant).join('');

  const renderPage = (page) => {
    if (page.type === 'tokens') {
      return `<iframe class="stylebook-frame" src="_tokens/${page.id}.html" title="${escape(page.title)}"></iframe>`;
    }
    if (page.template) {
      return `<iframe class="stylebook-frame" src="_pages/${page.id}.html" title="${escape(page.title)}"></iframe>`;
    }
    return `<div class="stylebook-content">${page.content || `<h1>${escape(page.title)}</h1>`}</div>`;
  };

  const render = () => {
    const path = window.location.hash.replace(/^#\/?/, '').replace(/\/$/, '');
    const item = findItem(path);
    if (!item) return;

    if (item.type === 'component') {
      app.innerHTML = renderComponent(state.components[item.itemId]);
    } else {
      app.innerHTML = renderPage(state.pages[item.itemId]);
    }

    document.title = `${item.title} - ${state.config.name}`;
    document.querySelectorAll('.stylebook-nav__item a').forEach(link => {
      link.classList.toggle('is-active', link.dataset.id === item.id);
    });
  };

  window.addEventListener('hashchange', render);
  render();
})();
"#;
