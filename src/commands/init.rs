//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Site
title: Portfolio
url: http://localhost:3000

# Directory
content_dir: src/content
public_dir: public

# Writing
render_bodies: true
highlight:
  enable: true
  theme: base16-ocean.dark

# Collections
# Leave `index` empty to list every file in the directory, sorted by name.
# Drafts can also be unlocked with SHOW_DRAFT_BLOG_POSTS=true and
# SHOW_DRAFT_CASE_STUDIES=true.
blog:
  dir: blog
  extension: mdx
  index: []
  show_drafts: false
case_studies:
  dir: case-studies
  extension: mdx
  index: []
  show_drafts: false

# Contact endpoint
contact:
  window_secs: 900
  max_requests: 5
  max_name_len: 100
  max_email_len: 255
  max_company_len: 100
  max_message_len: 2000
  spam_keywords: [crypto, bitcoin, investment, loan, casino]

# Server
server:
  ip: localhost
  port: 3000
"#;

const WELCOME_POST: &str = r#"---
title: Hello World
description: The first post on this site
status: live
category: Notes
tags: [meta]
publishedAt: 2024-01-01
---

Welcome! Edit or delete this post in `src/content/blog/hello-world.mdx`.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("src/content/blog"))?;
    fs::create_dir_all(target_dir.join("src/content/case-studies"))?;
    fs::create_dir_all(target_dir.join("public"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Config already exists: {:?}", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let post_path = target_dir.join("src/content/blog/hello-world.mdx");
    if !post_path.exists() {
        fs::write(&post_path, WELCOME_POST)?;
    }

    tracing::debug!("Initialized site in {:?}", target_dir);
    Ok(())
}
