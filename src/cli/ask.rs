//! TUI-less "ask" command

use std::error::Error;
use std::io::{self, Write};

use crate::cli::report_configuration_error;
use crate::core::conversation::Conversation;
use crate::core::message::Message;
use crate::core::session::{GeminiSessionFactory, SessionSettings};

pub async fn run_ask(prompt: Vec<String>, settings: SessionSettings) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: mediquery ask <prompt>");
        std::process::exit(1);
    }

    let factory = GeminiSessionFactory::new(settings);
    let mut conversation = Conversation::new();
    conversation.mount(&factory);
    if let Some(err) = conversation.configuration_error() {
        report_configuration_error(err);
        std::process::exit(err.exit_code());
    }

    let Some(pending) = conversation.submit(&prompt) else {
        return Err("the conversation did not accept the prompt".into());
    };
    let outcome = pending.run().await;
    let failure = outcome.as_ref().err().map(|err| err.to_string());
    conversation.settle(outcome);

    if let Some(reply) = conversation.last_message() {
        let mut stdout = io::stdout().lock();
        write_reply(&mut stdout, reply)?;
        stdout.flush()?;
    }

    if let Some(err) = failure {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

/// Print a bot reply followed by its numbered sources.
pub fn write_reply<W: Write>(out: &mut W, reply: &Message) -> io::Result<()> {
    writeln!(out, "{}", reply.text.trim_end())?;
    if reply.sources.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Sources:")?;
    for (index, source) in reply.sources.iter().enumerate() {
        writeln!(out, "  {}. {}", index + 1, source.title)?;
        writeln!(out, "     {}", source.uri)?;
    }
    Ok(())
}
