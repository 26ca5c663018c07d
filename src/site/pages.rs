// src/site/pages.rs
// =============================================================================
// HTML for the blog pages, built with maud.
//
// Every internal link goes through `ctx.static_page(..)`. On a normal
// request that is just the URL; during an export it also queues the URL
// for fetching. A link written as a plain string literal would render
// fine but never be exported.
// =============================================================================

use maud::{html, Markup, PreEscaped, DOCTYPE};
use pulldown_cmark::{html as cmark_html, Options, Parser};

use super::posts::BlogPost;
use crate::error::ExportError;
use crate::export::ExportReport;
use crate::tracker::{RenderContext, ROOT_URL};

fn layout(ctx: &RenderContext, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/style.css";
            }
            body {
                header {
                    a href=(ctx.static_page(ROOT_URL)) { "Home" }
                }
                main { (content) }
            }
        }
    }
}

pub fn index_page(ctx: &RenderContext, posts: &[BlogPost]) -> String {
    let content = html! {
        h1 { "Posts" }
        @if posts.is_empty() {
            p { "Nothing published yet." }
        } @else {
            ul.posts {
                @for post in posts {
                    li {
                        time datetime=(post.date()) { (post.date()) }
                        " "
                        a href=(ctx.static_page(post.url())) { (post.title()) }
                    }
                }
            }
        }
        // The static copy has no server behind it to run an export
        @if !ctx.is_export_render() {
            form method="post" action="/export" {
                button type="submit" { "Export static site" }
            }
        }
    };
    layout(ctx, "Posts", content).into_string()
}

pub fn post_page(ctx: &RenderContext, post: &BlogPost, markdown: &str) -> String {
    let content = html! {
        article {
            p.date { time datetime=(post.date()) { (post.date()) } }
            (PreEscaped(render_markdown(markdown)))
        }
        nav {
            a href=(ctx.static_page(ROOT_URL)) { "All posts" }
        }
    };
    layout(ctx, &post.title(), content).into_string()
}

pub fn export_result_page(
    ctx: &RenderContext,
    result: &Result<ExportReport, ExportError>,
) -> String {
    let content = match result {
        Ok(report) => html! {
            h1 { "Export finished" }
            p {
                (report.pages.len()) " page(s) and " (report.assets_copied)
                " asset(s) written to " code { (report.output_dir.display()) }
            }
            ul {
                @for page in &report.pages {
                    li { code { (page.url) } }
                }
            }
            @if !report.failed.is_empty() {
                h2 { "Skipped" }
                ul.failed {
                    @for failed in &report.failed {
                        li { code { (failed.url) } ": " (failed.reason) }
                    }
                }
            }
        },
        Err(e) => html! {
            h1 { "Export failed" }
            p.error { (e.to_string()) }
        },
    };
    layout(ctx, "Export", content).into_string()
}

pub fn not_found_page(ctx: &RenderContext) -> String {
    layout(ctx, "Not found", html! { h1 { "Page not found" } }).into_string()
}

fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    cmark_html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}
