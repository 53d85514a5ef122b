use std::env;

use anyhow::{Context, Result};
use simple_mailer::{Attachment, MailConfig, Mailer};

// SMTP_USER=me@example.com SMTP_PASSWORD=... SMTP_HOST=smtp.example.com \
//     cargo run --example send_html -- you@example.com,them@example.com [attachment]
#[tokio::main]
async fn main() -> Result<()> {
    let sender = env::var("SMTP_USER").context("SMTP_USER is not set")?;
    let password = env::var("SMTP_PASSWORD").context("SMTP_PASSWORD is not set")?;
    let host = env::var("SMTP_HOST").context("SMTP_HOST is not set")?;
    let port = match env::var("SMTP_PORT") {
        Ok(port) => port.parse().context("SMTP_PORT is not a port number")?,
        Err(_) => 587,
    };

    let mut args = env::args().skip(1);
    let recipients = args.next().unwrap_or_default();
    let attachment = args
        .next()
        .map(Attachment::from_path)
        .transpose()
        .context("failed to read attachment")?;

    let config = MailConfig::new(sender, password, host)
        .with_port(port)
        .with_recipients(recipients)
        .with_subject("Hello from simple-mailer")
        .with_body("<h1>Hello!</h1><p>This message was sent asynchronously.</p>")
        .with_attachments([attachment]);

    let Some(handle) = Mailer::smtp(config).send_async("demo-1", |outcome| {
        println!("completed: {outcome}");
    })?
    else {
        println!("No recipients given, nothing sent.");
        return Ok(());
    };

    let outcome = handle.outcome().await;
    println!("outcome: {outcome}");
    anyhow::ensure!(outcome.is_delivered(), "mail was not delivered");
    Ok(())
}
