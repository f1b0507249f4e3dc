use crate::comments::Notice;

use super::*;

/// A single approved comment as readers see it.
pub fn comment(comment: &Comment) -> Markup {
    html! {
        .comment {
            .comment-header {
                span.author { (comment.author) }
                time datetime=(comment.created_at.to_rfc3339()) {
                    (comment_date_string(&comment.created_at))
                }
            }
            p.content { (comment.content) }
        }
    }
}

/// The comment section under a post: approved comments, then the form.
///
/// `author` and `content` prefill the form; they are empty after a
/// successful submission.
pub fn comment_section(
    slug: &str,
    comments: &[Comment],
    author: &str,
    content: &str,
    notice: Option<Notice>,
) -> Markup {
    html! {
        section #comments {
            h3 { "Comments" }
            .comment-list {
                @for c in comments {
                    (self::comment(c))
                }
                @if comments.is_empty() {
                    p.empty { "No comments yet." }
                }
            }
            .comment-form {
                h4 { "Leave a comment" }
                form method="post" action={ "/posts/" (slug) "/comments" } {
                    label for="author" { "Name" }
                    input #author name="author" type="text" placeholder="Your name" value=(author) required;
                    label for="content" { "Comment" }
                    textarea #content name="content" rows="4" placeholder="What are your thoughts?" required {
                        (content)
                    }
                    @if let Some(notice) = notice {
                        p.notice.error[notice.is_error()] { (notice.message()) }
                    }
                    button type="submit" data-busy-label="Posting..." { "Post Comment" }
                }
            }
        }
    }
}
