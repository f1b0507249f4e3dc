use maud::DOCTYPE;

use super::*;

/// Site header and footer around page content.
pub(super) fn standard(body: Markup, site: &Site) -> Markup {
    html! {
        header #masthead {
            a.site-title href="/" { (site.title) }
            nav #topnav {
                a href="/" { "POSTS" }
            }
        }
        main {
            (body)
        }
        footer {
            p { "© " (site.author) }
        }
    }
}

/// The document shell shared by every page.
///
/// `resource` names the stylesheet and script loaded for the page.
pub(super) fn universal(
    body: Markup,
    headers: &HeaderMap,
    site: &Site,
    resource: &'static str,
    title: &str,
) -> Markup {
    universal_with_head(body, html! {}, headers, site, resource, title)
}

/// Like [`universal`], with extra elements appended to `head`.
pub(super) fn universal_with_head(
    body: Markup,
    head: Markup,
    headers: &HeaderMap,
    site: &Site,
    resource: &'static str,
    title: &str,
) -> Markup {
    let dark_theme = match get_cookie(headers, "blog_theme") {
        Some("dark") => Some("dark-theme"),
        _ => None,
    };

    html! {
        (DOCTYPE)
        html lang="en-us" {
            head {
                meta charset="utf-8";
                title { (title) " | " (site.title) }
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content=(site.tagline);
                link type="text/css" rel="stylesheet" href="/style/common.css";
                link type="text/css" rel="stylesheet" href={"/style/" (resource) ".css"};
                link rel="icon" type="image/svg+xml" href="/asset/favicon.svg";
                (head)
            }
            body class=[dark_theme] {
                (body)
                script type="module" src={"/script/" (resource) ".js"} {};
            }
        }
    }
}
