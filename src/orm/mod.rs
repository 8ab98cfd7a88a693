pub mod article_likes;
pub mod articles;
pub mod comments;
pub mod operators;
pub mod projects;
pub mod settings;
