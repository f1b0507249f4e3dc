use crate::moderation::{Action, Dashboard, Tab};

use super::*;

pub fn login(headers: &HeaderMap, site: &Site, error: Option<&str>) -> Markup {
    let body = html! {
        form #login method="post" action="/admin/login" {
            h1 { "Admin Login" }
            @if let Some(error) = error {
                p #error-msg { (error) }
            }
            input #email name="email" type="email" placeholder="Email" autocomplete="username" required;
            input #password name="password" type="password" placeholder="Password" autocomplete="current-password" required;
            button type="submit" data-busy-label="Logging in..." { "Login" }
        }
    };
    wrappers::universal(body, headers, site, "admin", "Admin login")
}

fn action_button(action: Action, comment: &Comment, tab: Tab) -> Markup {
    html! {
        a.button.(action.as_str())
            href={ "/admin/confirm/" (action.as_str()) "/" (comment.id) "?tab=" (tab.as_str()) } {
            @match action {
                Action::Approve => "Approve",
                Action::Delete => "Delete",
            }
        }
    }
}

fn pending_tab(dashboard: &Dashboard) -> Markup {
    html! {
        @if dashboard.pending.is_empty() {
            .empty { p { "No pending comments. Good job!" } }
        }
        @for comment in &dashboard.pending {
            .comment.pending {
                .comment-header {
                    span.author { (comment.author) }
                    span.slug { "Post: " (comment.slug) }
                }
                p.content { (comment.content) }
                .actions {
                    (action_button(Action::Delete, comment, Tab::Pending))
                    (action_button(Action::Approve, comment, Tab::Pending))
                }
            }
        }
    }
}

fn approved_tab(dashboard: &Dashboard) -> Markup {
    html! {
        @if dashboard.approved.is_empty() {
            .empty { p { "No approved comments found yet." } }
        }
        @for (slug, comments) in &dashboard.approved {
            section.post-group {
                h2 { "Blog Post: " a href={ "/posts/" (slug) } { (slug) } }
                @for comment in comments {
                    .comment.approved {
                        .comment-header {
                            span.author { (comment.author) }
                            time datetime=(comment.created_at.to_rfc3339()) {
                                (comment_date_string(&comment.created_at))
                            }
                        }
                        p.content { (comment.content) }
                        .actions {
                            (action_button(Action::Delete, comment, Tab::Approved))
                        }
                    }
                }
            }
        }
    }
}

pub fn dashboard(headers: &HeaderMap, site: &Site, dashboard: &Dashboard, tab: Tab) -> Markup {
    let body = html! {
        header #dashboard-header {
            h1 { "Comment Dashboard" }
            form method="post" action="/admin/logout" {
                button type="submit" { "Log out" }
            }
        }
        nav #tabs {
            a.selected[tab == Tab::Pending] href="/admin?tab=pending" {
                "Pending Reviews (" (dashboard.pending.len()) ")"
            }
            a.selected[tab == Tab::Approved] href="/admin?tab=approved" {
                "Approved Archive (" (dashboard.approved_count()) ")"
            }
        }
        #tab-content {
            @match tab {
                Tab::Pending => (pending_tab(dashboard)),
                Tab::Approved => (approved_tab(dashboard)),
            }
        }
    };
    wrappers::universal(body, headers, site, "admin", "Comment dashboard")
}

/// Ask the moderator to confirm an action before it runs.
///
/// `comment` is `None` when the comment no longer exists.
pub fn confirm(
    headers: &HeaderMap,
    site: &Site,
    action: Action,
    id: i64,
    comment: Option<&Comment>,
    tab: Tab,
) -> Markup {
    let back = format!("/admin?tab={}", tab.as_str());

    let body = html! {
        #confirm {
            @if let Some(comment) = comment {
                h1 { (action.prompt()) }
                .comment {
                    .comment-header {
                        span.author { (comment.author) }
                        span.slug { "Post: " (comment.slug) }
                    }
                    p.content { (comment.content) }
                }
                form method="post" action={ "/admin/" (action.as_str()) "/" (id) } {
                    input type="hidden" name="confirm" value="yes";
                    input type="hidden" name="tab" value=(tab.as_str());
                    a.button.cancel href=(back) { "Cancel" }
                    button.(action.as_str()) type="submit" { "Yes, " (action.as_str()) }
                }
            } @else {
                h1 { "This comment no longer exists." }
                a.button href=(back) { "Back to the dashboard" }
            }
        }
    };
    wrappers::universal(body, headers, site, "admin", "Confirm")
}
