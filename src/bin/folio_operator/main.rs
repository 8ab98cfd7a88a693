//! Create an operator account.
//!
//! Usage: `folio-operator <email>`; the password is read from the
//! `FOLIO_OPERATOR_PASSWORD` environment variable or the first line of stdin.

use anyhow::{bail, Context};
use env_logger::Env;
use folio::db::{create_schema, init_db};
use std::io::BufRead;

const MIN_PASSWORD_CHARS: usize = 12;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let email = match std::env::args().nth(1) {
        Some(email) => email,
        None => bail!("usage: folio-operator <email>"),
    };

    let password = match std::env::var("FOLIO_OPERATOR_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            eprintln!("Password for {}:", email);
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read password from stdin")?;
            line.trim_end_matches(&['\r', '\n'][..]).to_string()
        }
    };

    if password.chars().count() < MIN_PASSWORD_CHARS {
        bail!("password must be at least {} characters", MIN_PASSWORD_CHARS);
    }

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = init_db(url).await;
    create_schema(db).await.context("failed to create schema")?;

    let operator = folio::auth::create_operator(db, &email, &password)
        .await
        .context("failed to create operator")?;

    println!("Created operator {} ({})", operator.email, operator.id);
    Ok(())
}
