mod comment;
mod notification;
mod post;
mod user;

pub use comment::{Comment, CommentView, CreateCommentRequest, NewComment};
pub use notification::{
    CommentSnippet, NewNotification, Notification, NotificationKind, NotificationView,
    PostSnippet,
};
pub use post::{CreatePostRequest, NewPost, Post, PostView};
pub use user::{AuthorSummary, NewUser, ProfileUpdate, User};
