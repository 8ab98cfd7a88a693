pub mod app_config;
pub mod articles;
pub mod auth;
pub mod comments;
pub mod db;
pub mod email;
pub mod ip;
pub mod likes;
pub mod middleware;
pub mod moderation;
pub mod orm;
pub mod projects;
pub mod rate_limit;
pub mod settings;
pub mod spam;
pub mod web;
