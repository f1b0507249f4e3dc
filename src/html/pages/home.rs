use super::*;

pub fn home(headers: &HeaderMap, site: &Site, index: &Index) -> Markup {
    let body = html! {
        section #intro {
            h1 { (site.title) }
            p.tagline { (site.tagline) }
        }
        @if index.is_empty() {
            p.empty { "Nothing here yet." }
        }
        @for post in index.posts() {
            article.post-preview {
                @if let Some(cover) = &post.cover_image {
                    a href={ "/posts/" (post.slug) } {
                        img.cover src=(cover) alt={ "Cover image for " (post.title) };
                    }
                }
                h2 { a href={ "/posts/" (post.slug) } { (post.title) } }
                p.details {
                    time datetime=(post.date.to_rfc3339()) { (date_string(&post.date)) }
                    " · "
                    span.author { (post.author.name) }
                }
                p.excerpt { (post.excerpt) }
            }
        }
    };

    wrappers::universal(wrappers::standard(body, site), headers, site, "home", "Home")
}
