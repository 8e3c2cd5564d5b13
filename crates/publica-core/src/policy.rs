//! Authorization policy.
//!
//! Single source of truth for who may do what to a post. Both the post
//! service and the admin routes consult these functions, so the rules
//! cannot drift between entry points.

use crate::domain::{Post, Principal, Role};

/// Only the author may edit a post. There is no admin override for edits.
pub fn can_edit_post(principal: &Principal, post: &Post) -> bool {
    principal.id == post.author
}

/// The author or an admin may delete a post.
pub fn can_delete_post(principal: &Principal, post: &Post) -> bool {
    principal.id == post.author || principal.role == Role::Admin
}

/// Admins, moderators, and the author may lock or unlock comments.
pub fn can_toggle_comments(principal: &Principal, post: &Post) -> bool {
    matches!(principal.role, Role::Admin | Role::Moderator) || principal.id == post.author
}

/// Pinning is restricted to admins and moderators; authors may not pin
/// their own posts.
pub fn can_toggle_pin(principal: &Principal) -> bool {
    matches!(principal.role, Role::Admin | Role::Moderator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Post;
    use uuid::Uuid;

    fn post_by(author: Uuid) -> Post {
        Post::new(author, "content".to_string(), None, None, None)
    }

    fn principal(role: Role) -> Principal {
        Principal::new(Uuid::new_v4(), role)
    }

    #[test]
    fn author_may_edit_but_admin_may_not() {
        let author = Uuid::new_v4();
        let post = post_by(author);

        assert!(can_edit_post(&Principal::new(author, Role::User), &post));
        assert!(!can_edit_post(&principal(Role::Admin), &post));
    }

    #[test]
    fn delete_allows_author_and_admin_only() {
        let author = Uuid::new_v4();
        let post = post_by(author);

        assert!(can_delete_post(&Principal::new(author, Role::User), &post));
        assert!(can_delete_post(&principal(Role::Admin), &post));
        assert!(!can_delete_post(&principal(Role::Moderator), &post));
        assert!(!can_delete_post(&principal(Role::User), &post));
    }

    #[test]
    fn comment_toggle_allows_staff_and_author() {
        let author = Uuid::new_v4();
        let post = post_by(author);

        assert!(can_toggle_comments(&principal(Role::Admin), &post));
        assert!(can_toggle_comments(&principal(Role::Moderator), &post));
        assert!(can_toggle_comments(
            &Principal::new(author, Role::User),
            &post
        ));
        assert!(!can_toggle_comments(&principal(Role::User), &post));
    }

    #[test]
    fn pin_is_staff_only_even_for_the_author() {
        assert!(can_toggle_pin(&principal(Role::Admin)));
        assert!(can_toggle_pin(&principal(Role::Moderator)));
        assert!(!can_toggle_pin(&principal(Role::User)));
    }
}
