use super::*;

pub mod admin;
pub mod home;
pub mod post;

pub fn not_found(headers: &HeaderMap, site: &Site, slug: &str) -> Markup {
    let body = html! {
        h1 { "Not found" }
        p { "A post with the id " code { (slug) } " does not appear to exist." }
        a href="/" { "Return home" }
    };

    wrappers::universal(wrappers::standard(body, site), headers, site, "missing", "Not found")
}
