// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Share-link previews for social crawlers.

use crate::models::Portfolio;

/// User-Agent fragments of link-preview crawlers (matched case-insensitively).
const CRAWLER_MARKERS: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "slackbot",
    "discordbot",
    "linkedinbot",
    "whatsapp",
    "telegrambot",
    "skypeuripreview",
    "pinterest",
    "redditbot",
    "embedly",
    "applebot",
    "googlebot",
    "bingbot",
    "farcaster",
    "warpcast",
];

const DEFAULT_TITLE: &str = "Photo Portfolio";
const DEFAULT_DESCRIPTION: &str = "A photo portfolio";

/// Whether a request comes from a link-preview crawler.
pub fn is_social_crawler(user_agent: Option<&str>) -> bool {
    let Some(ua) = user_agent else {
        return false;
    };
    let ua = ua.to_ascii_lowercase();
    CRAWLER_MARKERS.iter().any(|marker| ua.contains(marker))
}

/// Frontend URL at which a human views a shared portfolio.
pub fn portfolio_page_url(frontend_url: &str, user_id: &str, portfolio_id: &str) -> String {
    format!(
        "{}/portfolio/{}/{}",
        frontend_url.trim_end_matches('/'),
        urlencoding::encode(user_id),
        urlencoding::encode(portfolio_id)
    )
}

/// Render the preview page served to crawlers.
///
/// A missing portfolio still gets a generic card so the link unfurls.
pub fn render_preview(portfolio: Option<&Portfolio>, page_url: &str) -> String {
    let (title, description, image, photo_count) = match portfolio {
        Some(p) => {
            let description = if p.description.is_empty() {
                format!("{} photos", p.photos.len())
            } else {
                p.description.clone()
            };
            (p.title.as_str(), description, p.cover_url(), p.photos.len())
        }
        None => (DEFAULT_TITLE, DEFAULT_DESCRIPTION.to_string(), None, 0),
    };

    let title = escape_html(title);
    let description = escape_html(&description);
    let page_url = escape_html(page_url);

    let mut meta = vec![
        r#"<meta property="og:type" content="website">"#.to_string(),
        format!(r#"<meta property="og:title" content="{title}">"#),
        format!(r#"<meta property="og:description" content="{description}">"#),
        format!(r#"<meta property="og:url" content="{page_url}">"#),
        format!(r#"<meta name="twitter:title" content="{title}">"#),
        format!(r#"<meta name="twitter:description" content="{description}">"#),
    ];
    match image {
        Some(url) => {
            let url = escape_html(url);
            meta.push(r#"<meta name="twitter:card" content="summary_large_image">"#.to_string());
            meta.push(format!(r#"<meta property="og:image" content="{url}">"#));
            meta.push(format!(r#"<meta name="twitter:image" content="{url}">"#));
        }
        None => meta.push(r#"<meta name="twitter:card" content="summary">"#.to_string()),
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n{meta}\n</head>\n<body>\n\
         <h1>{title}</h1>\n<p>{description}</p>\n<p>{photo_count} photos</p>\n\
         <a href=\"{page_url}\">View portfolio</a>\n</body>\n</html>\n",
        meta = meta.join("\n"),
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
