use crate::comments::Notice;

use super::*;

/// A post page with its comment section.
pub fn post(
    headers: &HeaderMap,
    site: &Site,
    post: &Post,
    comments: &[Comment],
    form: (&str, &str),
    notice: Option<Notice>,
) -> Markup {
    let (author, content) = form;

    let body = html! {
        article {
            header.post-header {
                h1 { (post.title) }
                .byline {
                    @if let Some(picture) = &post.author.picture {
                        img.avatar src=(picture) alt=(post.author.name);
                    }
                    span.author { (post.author.name) }
                    time datetime=(post.date.to_rfc3339()) { (date_string(&post.date)) }
                }
                @if let Some(cover) = &post.cover_image {
                    img.cover src=(cover) alt={ "Cover image for " (post.title) };
                }
            }
            .post-body {
                (PreEscaped(&post.html))
            }
            (components::comment_section(&post.slug, comments, author, content, notice))
        }
    };

    let head = html! {
        meta property="og:title" content=(post.title);
        meta property="og:description" content=(post.excerpt);
        meta property="og:url" content=(absolute_url(site, &format!("/posts/{}", post.slug)));
        @if let Some(image) = &post.og_image {
            meta property="og:image" content=(absolute_url(site, image));
        }
    };

    wrappers::universal_with_head(
        wrappers::standard(body, site),
        head,
        headers,
        site,
        "post",
        &post.title,
    )
}

/// Resolve a site-relative path against the configured base URL.
fn absolute_url(site: &Site, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    format!(
        "{}/{}",
        site.base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
